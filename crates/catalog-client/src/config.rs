//! Client configuration
//!
//! Values come from the environment with documented defaults; command-line
//! front ends override individual fields with the `with_*` builders.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
/// Default API key sent on mutating requests
pub const DEFAULT_API_KEY: &str = "tasknapi";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the base URL
pub const BASE_URL_ENV: &str = "CATALOG_API_BASE_URL";
/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CATALOG_API_KEY";
/// Environment variable holding the timeout in seconds
pub const TIMEOUT_ENV: &str = "CATALOG_API_TIMEOUT_SECS";

/// Catalog client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Credential for the `x-api-key` header
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` if the timeout is not a positive integer
    /// - `ConfigError::EmptyBaseUrl` if the base URL is blank
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// # Errors
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        if let Some(api_key) = lookup(API_KEY_ENV) {
            config.api_key = api_key;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// With base URL; a trailing slash is dropped
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check invariants
    ///
    /// # Errors
    /// `ConfigError::EmptyBaseUrl` if the base URL is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
