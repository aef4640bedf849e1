//! Credential store backed by a Supabase (PostgREST) table.
//!
//! This module handles:
//! - The credential record and partial-update payload
//! - Reading and patching the record over the REST API

pub mod client;
pub mod types;

pub use client::StoreClient;
pub use types::{CredentialRecord, TokenUpdate};

/// The single user whose tokens this relay maintains.
pub const USER_ID: &str = "20260404";

/// Table holding the credential records.
pub const TOKEN_TABLE: &str = "whoop_tokens";
