//! Token endpoint response types.

use serde::Deserialize;

/// Successful token endpoint response.
///
/// WHOOP also returns `token_type` and `scope`; they are not needed here.
#[derive(Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// New refresh token. The old one is invalidated by the exchange.
    pub refresh_token: String,
    /// Lifetime of the access token in seconds. Any JSON number is accepted.
    pub expires_in: f64,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
