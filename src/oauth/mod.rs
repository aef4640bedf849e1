//! WHOOP authorization server client (refresh-token grant).

pub mod client;
pub mod types;

pub use client::WhoopOAuthClient;
pub use types::TokenResponse;

/// Scope requested on refresh so a new refresh token is issued.
pub const OFFLINE_SCOPE: &str = "offline";
