use axum::{extract::State, Json};
use rota_core::models::pharmacist::{Clinic, Directorate, Pharmacist};
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn list_pharmacists(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Pharmacist>>, AppError> {
    Ok(Json(state.service.list_pharmacists().await?))
}

#[axum::debug_handler]
pub async fn list_clinics(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Clinic>>, AppError> {
    Ok(Json(state.service.list_clinics().await?))
}

#[axum::debug_handler]
pub async fn list_directorates(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Directorate>>, AppError> {
    Ok(Json(state.service.list_directorates().await?))
}
