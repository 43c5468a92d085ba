//! Handlers that operate on one week of the grid.
//!
//! Each request opens a short-lived editing session, so every response
//! reflects the remote state after the request's writes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Weekday};
use rota_core::{
    errors::RotaError,
    models::{rota::RotaStatus, time_slot::Week},
    service::RotaService,
};
use rota_engine::{
    conflict::Conflict,
    edit::CellEdit,
    editor::EditReport,
    index::AssignmentIndex,
    publish::PublishOutcome,
    session::{Actor, EditSession, RuleOverrides},
    swap::{SwapCell, SwapOutcome},
    RotaEditor,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::debug;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub view: Option<RotaStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub active: bool,
    pub rota_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekEditRequest {
    #[serde(default)]
    pub view: Option<RotaStatus>,
    pub edit: CellEdit,
    #[serde(default)]
    pub rule_overrides: HashMap<Uuid, RuleOverrides>,
    #[serde(default)]
    pub selected_weekdays: Option<Vec<Weekday>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    #[serde(default)]
    pub view: Option<RotaStatus>,
    pub source: SwapCell,
    pub target: SwapCell,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishWeekRequest {
    pub user_name: String,
    #[serde(default)]
    pub free_cell_text: BTreeMap<String, String>,
}

/// Opens an editor over `start`'s week.
///
/// The published view edits the newest published copy of each day; it is
/// an error to open it for a week that was never published.
async fn open_editor(
    state: &ApiState,
    start: NaiveDate,
    view: Option<RotaStatus>,
) -> Result<RotaEditor<dyn RotaService>, AppError> {
    let week = Week::containing(start);
    let session = match view.unwrap_or(RotaStatus::Draft) {
        RotaStatus::Draft => EditSession::new(week),
        RotaStatus::Published => {
            let remote = state.service.list_rotas(RotaStatus::Published).await?;
            let index = AssignmentIndex::build(week, RotaStatus::Published, &remote, None);
            let published: Vec<_> = index.rotas().cloned().collect();
            if published.is_empty() {
                return Err(RotaError::NotFound(format!(
                    "No published rotas for week of {}",
                    week.start
                ))
                .into());
            }
            EditSession::editing_published(week, published)
        }
    };

    Ok(RotaEditor::load(Arc::clone(&state.service), session, state.generation.clone()).await?)
}

#[axum::debug_handler]
pub async fn list_days(
    State(state): State<Arc<ApiState>>,
    Path(start): Path<NaiveDate>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<DayStatus>>, AppError> {
    let editor = open_editor(&state, start, query.view).await?;
    let days = editor
        .session()
        .week
        .dates()
        .into_iter()
        .map(|date| DayStatus {
            date,
            weekday: date.weekday(),
            active: editor.is_day_active(date),
            rota_id: editor.index().rota_for(date).map(|rota| rota.id),
        })
        .collect();

    Ok(Json(days))
}

#[axum::debug_handler]
pub async fn list_conflicts(
    State(state): State<Arc<ApiState>>,
    Path(start): Path<NaiveDate>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<Conflict>>, AppError> {
    let editor = open_editor(&state, start, query.view).await?;
    Ok(Json(editor.week_conflicts()))
}

#[axum::debug_handler]
pub async fn apply_edit(
    State(state): State<Arc<ApiState>>,
    Path(start): Path<NaiveDate>,
    Json(payload): Json<WeekEditRequest>,
) -> Result<Json<EditReport>, AppError> {
    let mut editor = open_editor(&state, start, payload.view).await?;
    {
        let session = editor.session_mut();
        session.rule_overrides = payload.rule_overrides;
        if let Some(days) = payload.selected_weekdays {
            session.selected_weekdays = days.into_iter().collect();
        }
    }

    let report = editor.apply_edit(&payload.edit).await?;
    debug!(
        "Week edit for {}: {} intents applied, {} warnings",
        start,
        report.report.applied.len(),
        report.warnings.len()
    );
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn swap_cells(
    State(state): State<Arc<ApiState>>,
    Path(start): Path<NaiveDate>,
    Json(payload): Json<SwapRequest>,
) -> Result<Json<SwapOutcome>, AppError> {
    let mut editor = open_editor(&state, start, payload.view).await?;
    editor.arm_swap(payload.source)?;
    editor.hover_swap(payload.target);
    Ok(Json(editor.drop_swap().await?))
}

#[axum::debug_handler]
pub async fn publish_week(
    State(state): State<Arc<ApiState>>,
    Path(start): Path<NaiveDate>,
    Json(payload): Json<PublishWeekRequest>,
) -> Result<Json<PublishOutcome>, AppError> {
    if payload.user_name.trim().is_empty() {
        return Err(RotaError::Validation("Publishing requires a user name".to_string()).into());
    }

    let mut editor = open_editor(&state, start, Some(RotaStatus::Draft)).await?;
    editor.session_mut().free_cell_text = payload.free_cell_text;
    let actor = Actor {
        name: payload.user_name,
    };
    Ok(Json(editor.publish(&actor).await?))
}
