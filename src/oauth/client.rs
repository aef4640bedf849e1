//! Refresh-token grant against the WHOOP token endpoint.

use std::time::Duration;

use tracing::{error, instrument};

use crate::config::Config;
use crate::error::RefreshError;
use crate::metrics::{UpstreamTimer, ENDPOINT_TOKEN};

use super::types::TokenResponse;
use super::OFFLINE_SCOPE;

/// WHOOP OAuth client.
#[derive(Clone)]
pub struct WhoopOAuthClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Token endpoint URL.
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for WhoopOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhoopOAuthClient")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl WhoopOAuthClient {
    /// Create an OAuth client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()?;

        Ok(Self::with_http(
            http,
            &config.whoop_token_url,
            &config.whoop_client_id,
            &config.whoop_client_secret,
        ))
    }

    /// Create an OAuth client around an existing HTTP client.
    pub fn with_http(
        http: reqwest::Client,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            http,
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// Exchange `refresh_token` for a new token pair.
    ///
    /// A non-success answer is returned as [`RefreshError::AuthExchange`] with
    /// the upstream status and body untouched.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        let _timer = UpstreamTimer::new(ENDPOINT_TOKEN);

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", OFFLINE_SCOPE),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| RefreshError::Internal(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RefreshError::Internal(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            error!(%status, body = %body, "WHOOP API error");
            return Err(RefreshError::AuthExchange { status, body });
        }

        serde_json::from_str(&body)
            .map_err(|e| RefreshError::Internal(format!("failed to parse token response: {e}")))
    }
}
