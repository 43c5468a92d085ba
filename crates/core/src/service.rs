//! Contract for the remote collaborator that owns rota persistence.
//!
//! The engine never stores rotas itself; it mirrors remote state through
//! these calls and rebuilds its working copy afterwards.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RotaResult;
use crate::models::{
    assignment::Assignment,
    availability::AvailabilityRule,
    pharmacist::{Clinic, Directorate, Pharmacist},
    rota::{AssignmentSlot, Rota, RotaStatus},
};

/// Inputs to server-side weekly rota generation.
///
/// Unavailability is supplied fully resolved (permanent rules with session
/// overrides applied), never as raw rule lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRotaRequest {
    pub start_date: NaiveDate,
    pub pharmacist_ids: Vec<Uuid>,
    pub clinic_ids: Vec<Uuid>,
    #[serde(default)]
    pub working_days_by_pharmacist: HashMap<Uuid, Vec<Weekday>>,
    #[serde(default)]
    pub single_pharmacist_dispensary_days: Vec<Weekday>,
    #[serde(default)]
    pub regenerate: bool,
    #[serde(default)]
    pub unavailable_rules_by_pharmacist: HashMap<Uuid, Vec<AvailabilityRule>>,
    pub selected_weekdays: Vec<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub assignment_index: AssignmentSlot,
    pub pharmacist_id: Option<Uuid>,
    #[serde(default)]
    pub new_assignment: Option<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRotaRequest {
    pub user_name: String,
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRotaResponse {
    pub published_rota_ids: Vec<Uuid>,
}

#[async_trait]
pub trait RotaService: Send + Sync {
    async fn list_pharmacists(&self) -> RotaResult<Vec<Pharmacist>>;

    async fn list_clinics(&self) -> RotaResult<Vec<Clinic>>;

    async fn list_directorates(&self) -> RotaResult<Vec<Directorate>>;

    async fn list_rotas(&self, status: RotaStatus) -> RotaResult<Vec<Rota>>;

    /// Returns the ids of the draft rotas produced for the week.
    async fn generate_weekly_rota(&self, request: GenerateRotaRequest) -> RotaResult<Vec<Uuid>>;

    async fn update_rota_assignment(
        &self,
        rota_id: Uuid,
        slot: AssignmentSlot,
        pharmacist_id: Option<Uuid>,
        new_assignment: Option<Assignment>,
    ) -> RotaResult<()>;

    /// Carbon-copies every draft of the seed rota's week into published
    /// snapshots and returns their ids.
    async fn publish_rota(
        &self,
        rota_id: Uuid,
        user_name: &str,
        week_start_date: NaiveDate,
    ) -> RotaResult<Vec<Uuid>>;

    async fn save_free_cell_text(
        &self,
        rota_id: Uuid,
        free_cell_text: BTreeMap<String, String>,
    ) -> RotaResult<()>;
}
