//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field: field.into(), reason: reason.into() }
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an http(s) origin
    /// - `cache_prefix` or `version` is empty
    /// - `precache_urls` is empty or holds a relative path
    /// - `dynamic_patterns` holds an empty pattern
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    ///
    /// Returns `ConfigError::Missing` if `precache_urls` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin =
            url::Url::parse(&self.origin).map_err(|e| ConfigError::invalid("origin", format!("not a URL: {e}")))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::invalid("origin", "scheme must be http or https"));
        }
        if origin.path() != "/" || origin.query().is_some() {
            return Err(ConfigError::invalid("origin", "must not carry a path or query"));
        }

        if self.cache_prefix.trim().is_empty() {
            return Err(ConfigError::invalid("cache_prefix", "must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::invalid("version", "must not be empty"));
        }

        if self.precache_urls.is_empty() {
            return Err(ConfigError::Missing {
                field: "precache_urls".into(),
                hint: "List at least the root document, e.g. SHELLCACHE_PRECACHE_URLS='[\"/\"]'".into(),
            });
        }
        if let Some(bad) = self.precache_urls.iter().find(|u| !u.starts_with('/')) {
            return Err(ConfigError::invalid("precache_urls", format!("{bad} is not an absolute path")));
        }

        if self.dynamic_patterns.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::invalid("dynamic_patterns", "patterns must not be empty"));
        }

        if !self.root_document.starts_with('/') {
            return Err(ConfigError::invalid("root_document", "must be an absolute path"));
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        if !self.precache_urls.contains(&self.root_document) {
            tracing::warn!(
                root_document = %self.root_document,
                "root document is not precached; navigations will need the network"
            );
        }

        Ok(())
    }
}
