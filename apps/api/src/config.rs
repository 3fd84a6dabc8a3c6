use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::resume::repository::DEFAULT_PURPOSE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// The real personnel-record service over HTTP.
    Http,
    /// In-process demo store, seeded with sample records.
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_mode: UpstreamMode,
    pub upstream_base_url: Option<String>,
    pub upstream_api_token: Option<String>,
    pub upstream_timeout: Duration,
    pub default_resume_purpose: String,
    /// Zero disables the directory snapshot cache.
    pub directory_cache_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let upstream_mode = match var("UPSTREAM_MODE").as_deref().map(str::trim) {
            None | Some("http") => UpstreamMode::Http,
            Some("memory") => UpstreamMode::Memory,
            Some(other) => bail!("UPSTREAM_MODE must be 'http' or 'memory', got '{other}'"),
        };

        let upstream_base_url = match upstream_mode {
            UpstreamMode::Http => Some(require_var(&var, "UPSTREAM_BASE_URL")?),
            UpstreamMode::Memory => var("UPSTREAM_BASE_URL"),
        };

        Ok(Config {
            upstream_mode,
            upstream_base_url,
            upstream_api_token: var("UPSTREAM_API_TOKEN"),
            upstream_timeout: Duration::from_secs(parse_var(&var, "UPSTREAM_TIMEOUT_SECS", 30)?),
            default_resume_purpose: var("DEFAULT_RESUME_PURPOSE")
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string()),
            directory_cache_ttl: Duration::from_secs(parse_var(
                &var,
                "DIRECTORY_CACHE_TTL_SECS",
                30,
            )?),
            port: parse_var(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_var(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
