// [apps/api/src/config.rs]
//! Environment configuration. `MOBILE_TICKET_ENDPOINT_AUTH_TOKEN`
//! does double duty: it's both the credential the Dispatch Worker
//! sends when it posts to `/sos/intake` and the value `auth_guard`
//! checks to recognise that call as the trusted webhook caller, so
//! the two apps share one configured secret instead of two.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_access_token: Option<String>,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub assignment_window_seconds: i64,
    pub reject_cooldown_seconds: i64,
    pub duplicate_radius_m: f64,
    pub duplicate_window_seconds: i64,
    pub mobile_ticket_endpoint_auth_token: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_access_token: std::env::var("TURSO_AUTH_TOKEN").ok(),
            port: parse_env_or("PORT", 3000),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            assignment_window_seconds: parse_env_or("ASSIGNMENT_WINDOW_SECONDS", 600),
            reject_cooldown_seconds: parse_env_or("REJECT_COOLDOWN_SECONDS", 900),
            duplicate_radius_m: parse_env_or("DUPLICATE_RADIUS_M", 500.0),
            duplicate_window_seconds: parse_env_or("DUPLICATE_WINDOW_SECONDS", 1800),
            mobile_ticket_endpoint_auth_token: std::env::var("MOBILE_TICKET_ENDPOINT_AUTH_TOKEN").unwrap_or_default(),
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}
