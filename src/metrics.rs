//! Metrics for refresh outcomes and upstream latency.
//!
//! Recorded through the `metrics` facade; whichever recorder the host process
//! installs receives them. Without a recorder the calls are no-ops.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::error::RefreshStage;

// === Metric Name Constants ===

/// Refresh attempts counter metric name.
pub const METRIC_REFRESH_ATTEMPTS: &str = "refresh_attempts_total";
/// Successful refreshes counter metric name.
pub const METRIC_REFRESH_SUCCESS: &str = "refresh_success_total";
/// Failed refreshes counter metric name, labelled by stage.
pub const METRIC_REFRESH_FAILURES: &str = "refresh_failures_total";
/// Upstream request latency metric name, labelled by endpoint.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";

/// Endpoint label for the credential read.
pub const ENDPOINT_STORE_FETCH: &str = "store_fetch";
/// Endpoint label for the credential patch.
pub const ENDPOINT_STORE_UPDATE: &str = "store_update";
/// Endpoint label for the token exchange.
pub const ENDPOINT_TOKEN: &str = "oauth_token";

/// Initialize all metric descriptions.
/// Call this once at startup.
pub fn init_metrics() {
    describe_counter!(METRIC_REFRESH_ATTEMPTS, "Total number of refresh attempts");
    describe_counter!(METRIC_REFRESH_SUCCESS, "Total number of successful refreshes");
    describe_counter!(
        METRIC_REFRESH_FAILURES,
        "Total number of failed refreshes by pipeline stage"
    );
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Latency of calls to the store and authorization server in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Increment refresh attempts counter.
pub fn inc_refresh_attempts() {
    counter!(METRIC_REFRESH_ATTEMPTS).increment(1);
}

/// Increment refresh success counter.
pub fn inc_refresh_success() {
    counter!(METRIC_REFRESH_SUCCESS).increment(1);
}

/// Increment refresh failure counter for a stage. `None` means an unclassified failure.
pub fn inc_refresh_failures(stage: Option<RefreshStage>) {
    let label = stage.map(|s| s.as_ref().to_string()).unwrap_or_else(|| "internal".to_string());
    counter!(METRIC_REFRESH_FAILURES, "stage" => label).increment(1);
}

/// Record latency of an upstream call.
pub fn record_upstream_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// RAII guard for timing an upstream call.
/// Records latency when dropped, so early returns are measured too.
pub struct UpstreamTimer {
    start: Instant,
    endpoint: &'static str,
}

impl UpstreamTimer {
    /// Start timing a call to `endpoint`.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }
}

impl Drop for UpstreamTimer {
    fn drop(&mut self) {
        record_upstream_latency(self.start, self.endpoint);
    }
}
