use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::availability::{assign_stable_ids, AvailabilityRule};
use crate::models::time_slot::{hhmm, TimeRange};

/// Agenda-for-change pay band; drives the colour a pharmacist is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "Junior")]
    Junior,
    #[serde(rename = "6")]
    Band6,
    #[serde(rename = "7")]
    Band7,
    #[serde(rename = "8a")]
    Band8a,
    #[serde(rename = "8b")]
    Band8b,
    #[serde(rename = "EAU Practitioner")]
    EauPractitioner,
    #[serde(rename = "Dispensary Pharmacist")]
    DispensaryPharmacist,
}

impl Band {
    pub fn colour(&self) -> &'static str {
        match self {
            Band::Junior => "#fde68a",
            Band::Band6 => "#bbf7d0",
            Band::Band7 => "#bfdbfe",
            Band::Band8a => "#e9d5ff",
            Band::Band8b => "#fbcfe8",
            Band::EauPractitioner => "#fed7aa",
            Band::DispensaryPharmacist => "#e5e7eb",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PharmacistRecord")]
pub struct Pharmacist {
    pub id: Uuid,
    pub name: String,
    pub display_name: Option<String>,
    pub band: Band,
    pub working_days: Vec<Weekday>,
    pub is_default_pharmacist: bool,
    pub not_available_rules: Vec<AvailabilityRule>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PharmacistRecord {
    id: Uuid,
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    band: Band,
    #[serde(default)]
    working_days: Vec<Weekday>,
    #[serde(default)]
    is_default_pharmacist: bool,
    #[serde(default)]
    not_available_rules: Vec<AvailabilityRule>,
}

impl From<PharmacistRecord> for Pharmacist {
    fn from(mut record: PharmacistRecord) -> Self {
        assign_stable_ids(record.id, &mut record.not_available_rules);
        Pharmacist {
            id: record.id,
            name: record.name,
            display_name: record.display_name,
            band: record.band,
            working_days: record.working_days,
            is_default_pharmacist: record.is_default_pharmacist,
            not_available_rules: record.not_available_rules,
        }
    }
}

impl Pharmacist {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn works_on(&self, day: Weekday) -> bool {
        self.working_days.contains(&day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: chrono::NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: chrono::NaiveTime,
}

impl Clinic {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directorate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub wards: Vec<String>,
}
