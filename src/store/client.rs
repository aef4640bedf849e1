//! Supabase REST client for the credential record.

use std::time::Duration;

use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::error::RefreshError;
use crate::metrics::{UpstreamTimer, ENDPOINT_STORE_FETCH, ENDPOINT_STORE_UPDATE};

use super::types::{CredentialRecord, TokenUpdate};
use super::TOKEN_TABLE;

/// Client for the `whoop_tokens` table.
#[derive(Clone)]
pub struct StoreClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Project base URL without trailing slash.
    base_url: String,
    /// Service API key.
    api_key: String,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Create a store client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()?;

        Ok(Self::with_http(
            http,
            config.store_base_url(),
            &config.supabase_key,
        ))
    }

    /// Create a store client around an existing HTTP client.
    pub fn with_http(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TOKEN_TABLE)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Read the credential record for `user_id`.
    ///
    /// Fails when the store is unreachable, answers with a non-success status,
    /// or returns no rows. With several rows the first one wins.
    #[instrument(skip(self))]
    pub async fn fetch_record(&self, user_id: &str) -> Result<CredentialRecord, RefreshError> {
        let _timer = UpstreamTimer::new(ENDPOINT_STORE_FETCH);
        let filter = format!("eq.{user_id}");

        let response = self
            .authorized(self.http.get(self.table_url()))
            .query(&[("user_id", filter.as_str()), ("select", "*")])
            .send()
            .await
            .map_err(|e| RefreshError::Fetch {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Error fetching token");
            return Err(RefreshError::Fetch {
                reason: format!("HTTP {status}"),
            });
        }

        let rows: Vec<CredentialRecord> = response.json().await.map_err(|e| {
            RefreshError::Fetch {
                reason: format!("failed to parse records: {e}"),
            }
        })?;

        debug!(rows = rows.len(), "Credential rows returned");

        rows.into_iter().next().ok_or_else(|| {
            error!(user_id, "No credential record found");
            RefreshError::Fetch {
                reason: format!("no record for user {user_id}"),
            }
        })
    }

    /// Overwrite the token columns of the record for `user_id`.
    #[instrument(skip(self, update), fields(expires_at = %update.expires_at))]
    pub async fn update_tokens(
        &self,
        user_id: &str,
        update: &TokenUpdate,
    ) -> Result<(), RefreshError> {
        let _timer = UpstreamTimer::new(ENDPOINT_STORE_UPDATE);
        let filter = format!("eq.{user_id}");

        let response = self
            .authorized(self.http.patch(self.table_url()))
            .query(&[("user_id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await
            .map_err(|e| RefreshError::Persist {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Error updating token record");
            return Err(RefreshError::Persist {
                reason: format!("HTTP {status}"),
            });
        }

        Ok(())
    }
}
