use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use eyre::{eyre, Report};
use rota_core::models::{
    assignment::Assignment,
    availability::{assign_stable_ids, AvailabilityRule},
    pharmacist::{Band, Clinic, Directorate, Pharmacist},
    rota::{Rota, RotaStatus},
};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct DbPharmacist {
    pub id: Uuid,
    pub name: String,
    pub display_name: Option<String>,
    pub band: String,
    pub working_days: Json<Vec<Weekday>>,
    pub is_default_pharmacist: bool,
    pub not_available_rules: Json<Vec<AvailabilityRule>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbClinic {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDirectorate {
    pub id: Uuid,
    pub name: String,
    pub wards: Json<Vec<String>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRota {
    pub id: Uuid,
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub status: String,
    pub assignments: Json<Vec<Assignment>>,
    pub included_weekdays: Option<Json<Vec<Weekday>>>,
    pub free_cell_text: Json<BTreeMap<String, String>>,
    pub original_rota_id: Option<Uuid>,
    pub published_by: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Bands are stored by their display label, e.g. `"8a"`.
pub fn parse_band(label: &str) -> eyre::Result<Band> {
    serde_json::from_value(serde_json::Value::String(label.to_string()))
        .map_err(|e| eyre!("Unknown band '{}': {}", label, e))
}

impl TryFrom<DbPharmacist> for Pharmacist {
    type Error = Report;

    fn try_from(row: DbPharmacist) -> eyre::Result<Self> {
        let mut not_available_rules = row.not_available_rules.0;
        assign_stable_ids(row.id, &mut not_available_rules);
        Ok(Pharmacist {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            band: parse_band(&row.band)?,
            working_days: row.working_days.0,
            is_default_pharmacist: row.is_default_pharmacist,
            not_available_rules,
        })
    }
}

impl TryFrom<DbClinic> for Clinic {
    type Error = Report;

    fn try_from(row: DbClinic) -> eyre::Result<Self> {
        let day_of_week = row
            .day_of_week
            .parse::<Weekday>()
            .map_err(|_| eyre!("Clinic {} has invalid day '{}'", row.id, row.day_of_week))?;
        Ok(Clinic {
            id: row.id,
            name: row.name,
            day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

impl From<DbDirectorate> for Directorate {
    fn from(row: DbDirectorate) -> Self {
        Directorate {
            id: row.id,
            name: row.name,
            wards: row.wards.0,
        }
    }
}

impl TryFrom<DbRota> for Rota {
    type Error = Report;

    fn try_from(row: DbRota) -> eyre::Result<Self> {
        let status: RotaStatus = row
            .status
            .parse()
            .map_err(|e| eyre!("Rota {}: {}", row.id, e))?;
        Ok(Rota {
            id: row.id,
            date: row.date,
            week_start: row.week_start,
            status,
            assignments: row.assignments.0,
            included_weekdays: row.included_weekdays.map(|days| days.0),
            free_cell_text: row.free_cell_text.0,
            original_rota_id: row.original_rota_id,
            published_by: row.published_by,
            published_at: row.published_at,
            created_at: row.created_at,
        })
    }
}
