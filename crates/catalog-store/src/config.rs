//! Store configuration

use catalog_client::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable selecting the loading scope
pub const LOADING_SCOPE_ENV: &str = "CATALOG_LOADING_SCOPE";
/// Environment variable selecting the error retention policy
pub const ERROR_RETENTION_ENV: &str = "CATALOG_ERROR_RETENTION";

/// Which in-flight fetches suppress a new fetch request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingScope {
    /// One loading flag for the whole store: any fetch in flight suppresses
    /// fetches of every kind
    #[default]
    Shared,
    /// Each resource kind guards only against its own in-flight fetch
    PerResource,
}

impl LoadingScope {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "shared" => Some(Self::Shared),
            "per_resource" | "per-resource" => Some(Self::PerResource),
            _ => None,
        }
    }
}

/// What happens to a collection when its refresh fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRetention {
    /// Empty the collection
    #[default]
    Clear,
    /// Keep the last successfully fetched collection
    RetainLastGood,
}

impl ErrorRetention {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "retain" | "retain_last_good" | "retain-last-good" => Some(Self::RetainLastGood),
            _ => None,
        }
    }
}

/// Catalog store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Re-entrancy guard scope
    pub loading_scope: LoadingScope,
    /// Stale data policy on fetch failure
    pub error_retention: ErrorRetention,
    /// Buffered notices per subscriber before the oldest are dropped
    pub notice_capacity: usize,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for unrecognized values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(LOADING_SCOPE_ENV) {
            config.loading_scope =
                LoadingScope::parse(&raw).ok_or_else(|| invalid(LOADING_SCOPE_ENV, &raw))?;
        }
        if let Some(raw) = lookup(ERROR_RETENTION_ENV) {
            config.error_retention =
                ErrorRetention::parse(&raw).ok_or_else(|| invalid(ERROR_RETENTION_ENV, &raw))?;
        }
        Ok(config)
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    /// Same as [`StoreConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// With loading scope
    #[inline]
    #[must_use]
    pub fn with_loading_scope(mut self, scope: LoadingScope) -> Self {
        self.loading_scope = scope;
        self
    }

    /// With error retention policy
    #[inline]
    #[must_use]
    pub fn with_error_retention(mut self, retention: ErrorRetention) -> Self {
        self.error_retention = retention;
        self
    }

    /// With notice buffer capacity
    #[inline]
    #[must_use]
    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            loading_scope: LoadingScope::Shared,
            error_retention: ErrorRetention::Clear,
            notice_capacity: 32,
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_shared_flag_and_clearing() {
        let config = StoreConfig::default();
        assert_eq!(config.loading_scope, LoadingScope::Shared);
        assert_eq!(config.error_retention, ErrorRetention::Clear);
    }

    #[test]
    fn lookup_parses_policies() {
        let config = StoreConfig::from_lookup(|key| match key {
            LOADING_SCOPE_ENV => Some("per-resource".to_string()),
            ERROR_RETENTION_ENV => Some("retain".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.loading_scope, LoadingScope::PerResource);
        assert_eq!(config.error_retention, ErrorRetention::RetainLastGood);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = StoreConfig::from_lookup(|key| {
            (key == LOADING_SCOPE_ENV).then(|| "sometimes".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
