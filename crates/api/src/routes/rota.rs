use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/pharmacists", get(handlers::reference::list_pharmacists))
        .route("/api/clinics", get(handlers::reference::list_clinics))
        .route("/api/directorates", get(handlers::reference::list_directorates))
        .route("/api/rotas", get(handlers::rota::list_rotas))
        .route("/api/rotas/generate", post(handlers::rota::generate_rota))
        .route(
            "/api/rotas/:id/assignments",
            put(handlers::rota::update_assignment),
        )
        .route(
            "/api/rotas/:id/free-cell-text",
            put(handlers::rota::save_free_cell_text),
        )
        .route("/api/rotas/:id/publish", post(handlers::rota::publish_rota))
}
