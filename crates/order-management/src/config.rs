//! Runtime configuration loaded from environment variables.
//!
//! Klarna credentials and toggles live in the settings store, not here.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KOM_HTTP_TIMEOUT_SECS` - HTTP client timeout in seconds (default: 30)
//! - `KOM_USER_AGENT` - `User-Agent` header sent to Klarna (default: `kom/<version>`)
//! - `KOM_LOG_JSON` - Emit JSON logs when set to `1` or `true`

use std::time::Duration;

use thiserror::Error;

use crate::klarna::DEFAULT_USER_AGENT;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Order management runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KomConfig {
    /// Timeout applied to every Klarna request
    pub http_timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Log as JSON instead of human-readable lines
    pub log_json: bool,
}

impl Default for KomConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            log_json: false,
        }
    }
}

impl KomConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let http_timeout = match lookup("KOM_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        let user_agent = lookup("KOM_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        let log_json = lookup("KOM_LOG_JSON").is_some_and(|v| parse_flag(&v));

        Ok(Self {
            http_timeout,
            user_agent,
            log_json,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("KOM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "KOM_HTTP_TIMEOUT_SECS".to_string(),
            "timeout must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
