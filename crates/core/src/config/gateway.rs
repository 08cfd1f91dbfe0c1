//! Immutable routing configuration for the gateway.

use serde::{Deserialize, Serialize};
use url::Url;

use super::{AppConfig, ConfigError, NotificationConfig};

/// Partition names owned by one gateway version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheNames {
    pub precache: String,
    pub runtime: String,
}

impl CacheNames {
    /// Derive both partition names from a prefix and version tag.
    pub fn for_version(prefix: &str, version: &str) -> Self {
        Self { precache: format!("{prefix}-precache-{version}"), runtime: format!("{prefix}-runtime-{version}") }
    }

    /// Whether `name` belongs to this version.
    pub fn contains(&self, name: &str) -> bool {
        name == self.precache || name == self.runtime
    }

    /// Lookup order for cache-first matching.
    pub fn all(&self) -> [&str; 2] {
        [&self.precache, &self.runtime]
    }
}

/// Everything the gateway needs to route requests, fixed at construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub origin: Url,
    pub version: String,
    pub names: CacheNames,
    pub precache_urls: Vec<String>,
    pub dynamic_patterns: Vec<String>,
    pub root_document: String,
    pub offline_message: String,
    pub offline_html: String,
    pub notification: NotificationConfig,
}

impl GatewayConfig {
    pub(super) fn from_app(app: &AppConfig) -> Result<Self, ConfigError> {
        let origin = Url::parse(&app.origin).map_err(|e| ConfigError::invalid("origin", e.to_string()))?;
        Ok(Self {
            origin,
            version: app.version.clone(),
            names: CacheNames::for_version(&app.cache_prefix, &app.version),
            precache_urls: app.precache_urls.clone(),
            dynamic_patterns: app.dynamic_patterns.clone(),
            root_document: app.root_document.clone(),
            offline_message: app.offline_message.clone(),
            offline_html: app.offline_html.clone(),
            notification: app.notification.clone(),
        })
    }

    /// Default configuration served from `origin`.
    pub fn for_origin(origin: Url) -> Self {
        let app = AppConfig::default();
        Self {
            origin,
            version: app.version.clone(),
            names: CacheNames::for_version(&app.cache_prefix, &app.version),
            precache_urls: app.precache_urls,
            dynamic_patterns: app.dynamic_patterns,
            root_document: app.root_document,
            offline_message: app.offline_message,
            offline_html: app.offline_html,
            notification: app.notification,
        }
    }

    /// Replace the version tag, renaming both partitions.
    pub fn with_version(mut self, prefix: &str, version: &str) -> Self {
        self.version = version.to_string();
        self.names = CacheNames::for_version(prefix, version);
        self
    }

    pub fn with_precache_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve an origin-relative path against the gateway origin.
    pub fn resolve(&self, path: &str) -> Result<Url, crate::Error> {
        self.origin
            .join(path)
            .map_err(|e| crate::Error::InvalidUrl(format!("{path}: {e}")))
    }

    /// Absolute URL of the app shell document.
    pub fn root_url(&self) -> Result<Url, crate::Error> {
        self.resolve(&self.root_document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_names_embed_version() {
        let names = CacheNames::for_version("rex-ai", "v2.0.0");
        assert_eq!(names.precache, "rex-ai-precache-v2.0.0");
        assert_eq!(names.runtime, "rex-ai-runtime-v2.0.0");
        assert!(names.contains("rex-ai-runtime-v2.0.0"));
        assert!(!names.contains("rex-ai-runtime-v1.0.0"));
    }

    #[test]
    fn test_from_app_config() {
        let app = AppConfig { cache_prefix: "snello".into(), version: "v9".into(), ..Default::default() };
        let config = app.gateway().unwrap();
        assert_eq!(config.origin.as_str(), "http://localhost:8000/");
        assert_eq!(config.names.precache, "snello-precache-v9");
        assert_eq!(config.precache_urls, app.precache_urls);
    }

    #[test]
    fn test_resolve_paths() {
        let config = GatewayConfig::for_origin(Url::parse("https://app.example").unwrap());
        assert_eq!(config.root_url().unwrap().as_str(), "https://app.example/");
        assert_eq!(
            config.resolve("/static/style.css").unwrap().as_str(),
            "https://app.example/static/style.css"
        );
    }

    #[test]
    fn test_with_version_renames_partitions() {
        let config = GatewayConfig::for_origin(Url::parse("https://app.example").unwrap()).with_version("rex-ai", "v3");
        assert_eq!(config.version, "v3");
        assert_eq!(config.names.all(), ["rex-ai-precache-v3", "rex-ai-runtime-v3"]);
    }
}
