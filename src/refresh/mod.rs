//! The refresh pipeline: read the stored refresh token, exchange it, write the
//! new pair back.
//!
//! ```text
//! fetch_record ──► oauth refresh ──► update_tokens
//!   FetchError     AuthExchangeError   PersistError
//! ```
//!
//! Each stage short-circuits the next one. Nothing is retried.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::RefreshError;
use crate::metrics;
use crate::oauth::WhoopOAuthClient;
use crate::store::{StoreClient, TokenUpdate, USER_ID};

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-19T12:00:00.000Z`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// New expiry, exactly as written to the store.
    pub expires_at: String,
}

/// Runs the three-stage refresh for the configured user.
#[derive(Debug, Clone)]
pub struct RefreshWorkflow {
    store: StoreClient,
    authorizer: WhoopOAuthClient,
}

impl RefreshWorkflow {
    /// Create a workflow from its two upstream clients.
    pub fn new(store: StoreClient, authorizer: WhoopOAuthClient) -> Self {
        Self { store, authorizer }
    }

    /// Build both upstream clients from config.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(
            StoreClient::new(config)?,
            WhoopOAuthClient::new(config)?,
        ))
    }

    /// Refresh using the current UTC time.
    pub async fn run(&self) -> Result<RefreshOutcome, RefreshError> {
        self.run_at(OffsetDateTime::now_utc()).await
    }

    /// Refresh as if the current time were `now`.
    #[instrument(skip(self), fields(user_id = USER_ID))]
    pub async fn run_at(&self, now: OffsetDateTime) -> Result<RefreshOutcome, RefreshError> {
        metrics::inc_refresh_attempts();
        info!("Starting auto-refresh");

        let result = self.pipeline(now).await;

        match &result {
            Ok(outcome) => {
                metrics::inc_refresh_success();
                info!(expires_at = %outcome.expires_at, "Tokens refreshed");
            }
            Err(e) => {
                metrics::inc_refresh_failures(e.stage());
                warn!(stage = ?e.stage(), error = %e, "Auto-refresh failed");
            }
        }

        result
    }

    async fn pipeline(&self, now: OffsetDateTime) -> Result<RefreshOutcome, RefreshError> {
        let record = self.store.fetch_record(USER_ID).await?;
        info!("Token fetched from store");

        let tokens = self.authorizer.refresh(&record.refresh_token).await?;
        info!(expires_in = tokens.expires_in, "New tokens received from WHOOP");

        let expires_at = format_timestamp(compute_expiry(now, tokens.expires_in))?;
        let update = TokenUpdate {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: expires_at.clone(),
            updated_at: format_timestamp(now)?,
        };

        self.store.update_tokens(USER_ID, &update).await?;
        info!("Tokens saved to store");

        Ok(RefreshOutcome { expires_at })
    }
}

/// Expiry of a token issued at `now` with a lifetime of `expires_in` seconds.
///
/// Fractional lifetimes keep their sub-second part; out-of-range values saturate.
pub fn compute_expiry(now: OffsetDateTime, expires_in: f64) -> OffsetDateTime {
    now.saturating_add(Duration::saturating_seconds_f64(expires_in))
}

/// Render a timestamp in the format stored in the token table.
pub fn format_timestamp(ts: OffsetDateTime) -> Result<String, RefreshError> {
    ts.to_offset(time::UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| RefreshError::Internal(format!("failed to format timestamp: {e}")))
}
