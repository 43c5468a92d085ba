use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Weekday};
use rota_core::{
    errors::RotaError,
    models::{
        rota::{Rota, RotaStatus},
        time_slot::Week,
    },
    service::{PublishRotaRequest, PublishRotaResponse, UpdateAssignmentRequest},
};
use rota_engine::{
    generation,
    session::{EditSession, RuleOverrides},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::info;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct RotaListQuery {
    pub status: Option<RotaStatus>,
}

/// Selections a planner makes before asking for a generated week.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWeekRequest {
    pub start_date: NaiveDate,
    pub pharmacist_ids: Vec<Uuid>,
    #[serde(default)]
    pub clinic_ids: Vec<Uuid>,
    #[serde(default)]
    pub working_days: HashMap<Uuid, Vec<Weekday>>,
    #[serde(default)]
    pub single_pharmacist_dispensary_days: Vec<Weekday>,
    pub selected_weekdays: Vec<Weekday>,
    #[serde(default)]
    pub rule_overrides: HashMap<Uuid, RuleOverrides>,
    #[serde(default)]
    pub regenerate: bool,
}

impl GenerateWeekRequest {
    fn into_session(self) -> EditSession {
        let mut session = EditSession::new(Week::containing(self.start_date));
        session.selected_pharmacists = self.pharmacist_ids;
        session.selected_clinics = self.clinic_ids;
        session.working_days = self.working_days;
        session.single_pharmacist_dispensary_days =
            self.single_pharmacist_dispensary_days.into_iter().collect();
        session.selected_weekdays = self.selected_weekdays.into_iter().collect();
        session.rule_overrides = self.rule_overrides;
        session
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWeekResponse {
    pub rota_ids: Vec<Uuid>,
}

/// Lists rotas of one status; drafts when no status is given.
#[axum::debug_handler]
pub async fn list_rotas(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RotaListQuery>,
) -> Result<Json<Vec<Rota>>, AppError> {
    let status = query.status.unwrap_or(RotaStatus::Draft);
    Ok(Json(state.service.list_rotas(status).await?))
}

#[axum::debug_handler]
pub async fn generate_rota(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<GenerateWeekRequest>,
) -> Result<(StatusCode, Json<GenerateWeekResponse>), AppError> {
    let regenerate = payload.regenerate;
    let session = payload.into_session();
    let pharmacists = state.service.list_pharmacists().await?;

    let rota_ids = generation::generate(
        &state.generation,
        state.service.as_ref(),
        &session,
        &pharmacists,
        regenerate,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(GenerateWeekResponse { rota_ids })))
}

#[axum::debug_handler]
pub async fn update_assignment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .update_rota_assignment(
            id,
            payload.assignment_index,
            payload.pharmacist_id,
            payload.new_assignment,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn save_free_cell_text(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<StatusCode, AppError> {
    state.service.save_free_cell_text(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn publish_rota(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishRotaRequest>,
) -> Result<Json<PublishRotaResponse>, AppError> {
    if payload.user_name.trim().is_empty() {
        return Err(RotaError::Validation("Publishing requires a user name".to_string()).into());
    }

    let published_rota_ids = state
        .service
        .publish_rota(id, &payload.user_name, payload.week_start_date)
        .await?;
    info!(
        "Rota {} published by {} ({} copies)",
        id,
        payload.user_name,
        published_rota_ids.len()
    );

    Ok(Json(PublishRotaResponse { published_rota_ids }))
}
