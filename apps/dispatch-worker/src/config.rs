// [apps/dispatch-worker/src/config.rs]
//! Environment configuration. Every field has a sensible default;
//! only `DATABASE_URL` and the sink endpoint/token are required.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub database_access_token: Option<String>,
    pub ticket_creation_endpoint: String,
    pub ticket_endpoint_auth_token: String,
    pub worker_count: usize,
    pub max_attempts: u32,
    pub initial_backoff_seconds: f64,
    pub max_backoff_seconds: f64,
    pub fairness_ticket: u32,
    pub poll_interval_ms: u64,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_access_token: std::env::var("TURSO_AUTH_TOKEN").ok(),
            ticket_creation_endpoint: std::env::var("MOBILE_TICKET_CREATION_ENDPOINT")
                .context("MOBILE_TICKET_CREATION_ENDPOINT must be set")?,
            ticket_endpoint_auth_token: std::env::var("MOBILE_TICKET_ENDPOINT_AUTH_TOKEN").unwrap_or_default(),
            worker_count: parse_env_or("DISPATCH_WORKER_POOL_SIZE", 4),
            max_attempts: parse_env_or("MOBILE_DISPATCH_MAX_ATTEMPTS", 6),
            initial_backoff_seconds: parse_env_or("MOBILE_DISPATCH_INITIAL_BACKOFF_SECONDS", 1.0),
            max_backoff_seconds: parse_env_or("MOBILE_DISPATCH_MAX_BACKOFF_SECONDS", 300.0),
            fairness_ticket: parse_env_or::<u32>("DISPATCH_FAIRNESS_TICKET", 8).max(1),
            poll_interval_ms: parse_env_or("DISPATCH_POLL_INTERVAL_MS", 500),
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}
