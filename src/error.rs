//! Unified error types for the refresh relay.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The three fallible stages of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshStage {
    /// Reading the credential record.
    Fetch,
    /// Exchanging the refresh token.
    Exchange,
    /// Writing the new token pair back.
    Persist,
}

/// Errors produced by the refresh pipeline.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The credential record could not be read.
    #[error("failed to fetch token from database: {reason}")]
    Fetch {
        /// Reason for failure.
        reason: String,
    },

    /// The authorization server rejected the refresh.
    #[error("authorization server returned {status}: {body}")]
    AuthExchange {
        /// Upstream status code.
        status: StatusCode,
        /// Upstream body, unmodified.
        body: String,
    },

    /// The new token pair could not be written.
    #[error("failed to update database: {reason}")]
    Persist {
        /// Reason for failure.
        reason: String,
    },

    /// Anything else, such as a transport failure talking to the token endpoint.
    #[error("{0}")]
    Internal(String),
}

impl RefreshError {
    /// Which pipeline stage produced this error, if any.
    pub fn stage(&self) -> Option<RefreshStage> {
        match self {
            RefreshError::Fetch { .. } => Some(RefreshStage::Fetch),
            RefreshError::AuthExchange { .. } => Some(RefreshStage::Exchange),
            RefreshError::Persist { .. } => Some(RefreshStage::Persist),
            RefreshError::Internal(_) => None,
        }
    }
}

impl IntoResponse for RefreshError {
    fn into_response(self) -> Response {
        match self {
            RefreshError::Fetch { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch token from database" })),
            )
                .into_response(),
            RefreshError::AuthExchange { status, body } => {
                // Forward the upstream body as-is when it is JSON.
                if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
                } else {
                    (status, Json(json!({ "error": body }))).into_response()
                }
            }
            RefreshError::Persist { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update database" })),
            )
                .into_response(),
            RefreshError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
