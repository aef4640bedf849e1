//! HTTP API handlers.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::error::RefreshError;
use crate::refresh::RefreshWorkflow;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "whoop-refresh";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Refresh pipeline, shared read-only across requests.
    pub workflow: Arc<RefreshWorkflow>,
}

impl AppState {
    /// Create new app state.
    pub fn new(workflow: RefreshWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
}

/// Successful refresh response.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// New access token expiry.
    pub expires_at: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

/// Refresh handler - runs the pipeline once.
pub async fn auto_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, RefreshError> {
    let outcome = state.workflow.run().await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: "Tokens refreshed successfully",
        expires_at: outcome.expires_at,
    }))
}
