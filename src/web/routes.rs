use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

// API Routes - REST API for programmatic access
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Translation
            .route("/generate", post(handlers::api::generate))
            .route("/bind", post(handlers::api::bind))
            // Schema lifecycle
            .route(
                "/schema",
                get(handlers::api::get_schema).post(handlers::api::load_schema),
            )
            .route("/reset", post(handlers::api::reset))
            // Execution feedback and history
            .route("/feedback", post(handlers::api::feedback))
            .route("/history", get(handlers::api::history))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
