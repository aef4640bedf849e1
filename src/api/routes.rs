//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{auto_refresh, health, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/auto-refresh", get(auto_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
