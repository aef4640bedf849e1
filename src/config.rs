//! Application configuration loaded from environment variables.

use std::fmt;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Clone, Deserialize)]
pub struct Config {
    // === Credential Store (Supabase) ===
    /// Base URL of the Supabase project, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub supabase_url: String,

    /// Service API key, sent as both `apikey` and bearer token.
    #[serde(default)]
    pub supabase_key: String,

    // === WHOOP OAuth Client ===
    /// OAuth client id registered with WHOOP.
    #[serde(default)]
    pub whoop_client_id: String,

    /// OAuth client secret registered with WHOOP.
    #[serde(default)]
    pub whoop_client_secret: String,

    /// Token endpoint used for the refresh-token grant.
    #[serde(default = "default_token_url")]
    pub whoop_token_url: String,

    // === HTTP ===
    /// Outbound request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_token_url() -> String {
    "https://api.prod.whoop.com/oauth/oauth2/token".to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from explicit `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// Check if the configuration is usable for a refresh.
    ///
    /// Returns every problem found rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        let required = [
            ("SUPABASE_URL", &self.supabase_url),
            ("SUPABASE_KEY", &self.supabase_key),
            ("WHOOP_CLIENT_ID", &self.whoop_client_id),
            ("WHOOP_CLIENT_SECRET", &self.whoop_client_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{name} is required"));
            }
        }

        if !self.supabase_url.trim().is_empty() {
            check_http_url("SUPABASE_URL", &self.supabase_url, &mut problems);
        }
        check_http_url("WHOOP_TOKEN_URL", &self.whoop_token_url, &mut problems);

        if self.http_timeout_ms == 0 {
            problems.push("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Supabase base URL without a trailing slash.
    pub fn store_base_url(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }
}

fn check_http_url(name: &str, value: &str, problems: &mut Vec<String>) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => problems.push(format!(
            "{name} must use http or https, got {}",
            parsed.scheme()
        )),
        Err(e) => problems.push(format!("{name} is not a valid URL: {e}")),
    }
}

/// Mask a secret for display, keeping only the last four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &mask_secret(&self.supabase_key))
            .field("whoop_client_id", &self.whoop_client_id)
            .field("whoop_client_secret", &mask_secret(&self.whoop_client_secret))
            .field("whoop_token_url", &self.whoop_token_url)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("port", &self.port)
            .finish()
    }
}
