//! # Rota API
//!
//! The API crate exposes the pharmacy rota engine over HTTP. It lists the
//! reference data, drives weekly rota generation, and applies grid edits,
//! swaps and publication on behalf of a browser client.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into engine calls
//! - **Middleware**: Error mapping shared by every handler
//! - **Config**: Handle environment and application configuration
//!
//! Persistence sits behind the `RotaService` trait, so the same router runs
//! against PostgreSQL in production and an in-memory service in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use eyre::Result;
use rota_core::service::RotaService;
use rota_engine::generation::GenerationGuard;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rota_api::ApiState;
/// use rota_engine::mock::memory::InMemoryRotaService;
///
/// let state = Arc::new(ApiState::new(Arc::new(InMemoryRotaService::new())));
/// let app = rota_api::app(state);
/// # let _ = app;
/// ```
pub struct ApiState {
    /// Remote rota storage
    pub service: Arc<dyn RotaService>,
    /// Process-wide "generation in progress" flag
    pub generation: GenerationGuard,
}

impl ApiState {
    pub fn new(service: Arc<dyn RotaService>) -> Self {
        Self {
            service,
            generation: GenerationGuard::new(),
        }
    }
}

/// Builds the application router with all routes attached.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Reference data and rota endpoints
        .merge(routes::rota::routes())
        // Weekly grid editing endpoints
        .merge(routes::week::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and rota service
///
/// This function sets up logging, configures routes and middleware, and
/// serves HTTP until the listener fails.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rota_api::{config::ApiConfig, start_server};
/// use rota_engine::mock::memory::InMemoryRotaService;
///
/// # async fn run() -> eyre::Result<()> {
/// let config = ApiConfig::from_env()?;
/// start_server(config, Arc::new(InMemoryRotaService::new())).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, service: Arc<dyn RotaService>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(service));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
