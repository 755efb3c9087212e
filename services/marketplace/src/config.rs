use serde::Deserialize;

use croscout_core::config::Config;

/// Marketplace service configuration loaded once from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (OAuth state cache).
    pub redis_url: String,
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Frontend origin, used for CORS and links in emails.
    #[serde(default = "default_client_url")]
    pub client_url: String,

    pub mail_from: String,
    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,
    /// HTTP mail provider endpoint. Mail is only logged when unset.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,

    #[serde(default = "default_translate_url")]
    pub translate_url: String,
    #[serde(default = "default_translate_timeout_ms")]
    pub translate_timeout_ms: u64,
    #[serde(default = "default_translate_retries")]
    pub translate_retries: u32,

    /// Google sign-in is disabled unless all three are set.
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_url: Option<String>,

    #[serde(default = "default_outbox_poll_ms")]
    pub outbox_poll_ms: u64,
    #[serde(default = "default_outbox_max_attempts")]
    pub outbox_max_attempts: i32,
}

impl Config for MarketplaceConfig {}

impl MarketplaceConfig {
    /// `(client_id, client_secret, redirect_url)` when Google sign-in is configured.
    pub fn google_oauth(&self) -> Option<(&str, &str, &str)> {
        match (
            self.google_client_id.as_deref(),
            self.google_client_secret.as_deref(),
            self.google_redirect_url.as_deref(),
        ) {
            (Some(id), Some(secret), Some(redirect)) => Some((id, secret, redirect)),
            _ => None,
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_client_url() -> String {
    "http://localhost:3000".to_owned()
}

fn default_mail_from_name() -> String {
    "Croscout".to_owned()
}

fn default_translate_url() -> String {
    "https://translate.croscout.eu".to_owned()
}

fn default_translate_timeout_ms() -> u64 {
    5000
}

fn default_translate_retries() -> u32 {
    2
}

fn default_outbox_poll_ms() -> u64 {
    2000
}

fn default_outbox_max_attempts() -> i32 {
    5
}
