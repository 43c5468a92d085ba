use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/weeks/:start/days", get(handlers::week::list_days))
        .route(
            "/api/weeks/:start/conflicts",
            get(handlers::week::list_conflicts),
        )
        .route("/api/weeks/:start/edits", post(handlers::week::apply_edit))
        .route("/api/weeks/:start/swap", post(handlers::week::swap_cells))
        .route("/api/weeks/:start/publish", post(handlers::week::publish_week))
}
