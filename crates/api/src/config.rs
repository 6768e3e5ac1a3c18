//! Connection settings for the n8n public API.
//!
//! Values come from [`ConfigOverrides`] first, then the environment, then
//! the defaults:
//!
//! - `N8N_BASE`: base URL of the n8n instance (default `http://localhost:5678`)
//! - `N8N_API_KEY`: API key sent as `X-N8N-API-KEY` (default empty)
//! - `N8N_TIMEOUT_SECS`: per-request timeout in seconds (default 30)
//!
//! Empty variables are treated as unset.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::N8nApiError;

pub const BASE_URL_ENV: &str = "N8N_BASE";
pub const API_KEY_ENV: &str = "N8N_API_KEY";
pub const TIMEOUT_ENV: &str = "N8N_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings supplied ahead of the environment, such as command-line flags.
#[derive(Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

/// Validated base URL, credential and timeout for [`crate::N8nClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct N8nConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl N8nConfig {
    /// Build a configuration from explicit values.
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self, N8nApiError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_key: api_key.into(),
            timeout: validate_timeout(timeout)?,
        })
    }

    /// Build a configuration from `N8N_BASE`, `N8N_API_KEY` and `N8N_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, N8nApiError> {
        Self::resolve(ConfigOverrides::default())
    }

    /// Resolve each setting from `overrides`, then the environment, then the
    /// default. Only the value actually chosen is validated.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, N8nApiError> {
        let base_url = overrides
            .base_url
            .or_else(|| env_value(BASE_URL_ENV))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = overrides.api_key.or_else(|| env_value(API_KEY_ENV)).unwrap_or_default();
        let timeout = match overrides.timeout {
            Some(timeout) => timeout,
            None => match env_value(TIMEOUT_ENV) {
                Some(raw) => parse_timeout_secs(&raw)?,
                None => DEFAULT_TIMEOUT,
            },
        };
        Self::new(&base_url, api_key, timeout)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for N8nConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("N8nConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse a timeout given in whole seconds.
fn parse_timeout_secs(raw: &str) -> Result<Duration, N8nApiError> {
    let seconds: u64 = raw
        .trim()
        .parse()
        .map_err(|error| N8nApiError::config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}': {error}")))?;
    validate_timeout(Duration::from_secs(seconds))
}

fn validate_timeout(timeout: Duration) -> Result<Duration, N8nApiError> {
    if timeout.is_zero() {
        return Err(N8nApiError::config("request timeout must be greater than zero"));
    }
    Ok(timeout)
}

/// Validate a base URL and strip trailing slashes.
///
/// Rules:
/// - must parse as an absolute URL
/// - scheme must be `http` or `https`
/// - must include a host
fn normalize_base_url(base: &str) -> Result<String, N8nApiError> {
    let trimmed = base.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|error| N8nApiError::config(format!("invalid {BASE_URL_ENV} URL '{base}': {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(N8nApiError::config(format!(
            "{BASE_URL_ENV} must use http or https; got '{}://'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(N8nApiError::config(format!("{BASE_URL_ENV} must include a host")));
    }

    Ok(trimmed.to_string())
}
