//! On-demand WHOOP OAuth token refresh relay.
//!
//! A single HTTP endpoint reads the stored refresh token from a Supabase
//! table, exchanges it at the WHOOP token endpoint, and writes the new
//! access/refresh pair back:
//!
//! ```text
//! GET /auto-refresh
//!   ├─ GET   {supabase}/rest/v1/whoop_tokens?user_id=eq.…   (read)
//!   ├─ POST  api.prod.whoop.com/oauth/oauth2/token          (exchange)
//!   └─ PATCH {supabase}/rest/v1/whoop_tokens?user_id=eq.…   (write)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: Credential record client
//! - [`oauth`]: Authorization server client
//! - [`refresh`]: The three-stage refresh pipeline
//! - [`api`]: HTTP API for health and refresh
//! - [`metrics`]: Refresh and latency metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod oauth;
pub mod refresh;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
