//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies so every
//! endpoint fails the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rota_core::errors::RotaError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use rota_api::middleware::error_handling::AppError;
/// use rota_core::errors::RotaError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(RotaError::NotFound("No rota for that date".to_string()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub RotaError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RotaError::NotFound(_) => StatusCode::NOT_FOUND,
            RotaError::Validation(_) => StatusCode::BAD_REQUEST,
            RotaError::Conflict(_) => StatusCode::CONFLICT,
            RotaError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RotaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<RotaError> for AppError {
    fn from(err: RotaError) -> Self {
        AppError(err)
    }
}

/// Wraps the report in `RotaError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(RotaError::Database(err))
    }
}

/// Maps a RotaError straight to an HTTP response.
pub fn map_error(err: RotaError) -> Response {
    AppError(err).into_response()
}
