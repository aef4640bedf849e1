//! Credential record types as stored in the `whoop_tokens` table.

use serde::{Deserialize, Serialize};

/// One row of the token table.
///
/// Only the columns the relay needs are modelled; any others are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialRecord {
    /// Owner of the record. Stored as text or number depending on the schema.
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    /// Current access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token to exchange.
    pub refresh_token: String,
    /// Expiry of the current access token.
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Partial update written back after a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenUpdate {
    /// New access token.
    pub access_token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// New expiry, ISO-8601 UTC.
    pub expires_at: String,
    /// Time of this update, ISO-8601 UTC.
    pub updated_at: String,
}
