//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod gateway;
mod validation;

pub use gateway::{CacheNames, GatewayConfig};
pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*)
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the gateway serves. Requests to any other origin pass through.
    ///
    /// Set via SHELLCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix shared by every cache partition name.
    ///
    /// Set via SHELLCACHE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag embedded in partition names. Bumping it evicts every
    /// partition from the previous version on the next activation.
    ///
    /// Set via SHELLCACHE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// App shell paths added to the precache partition at install time.
    ///
    /// Set via SHELLCACHE_PRECACHE_URLS environment variable.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Path substrings identifying network-first endpoints.
    ///
    /// Set via SHELLCACHE_DYNAMIC_PATTERNS environment variable.
    #[serde(default = "default_dynamic_patterns")]
    pub dynamic_patterns: Vec<String>,

    /// Canonical key of the app shell document.
    #[serde(default = "default_root_document")]
    pub root_document: String,

    /// Message carried by the JSON fallback for dynamic endpoints.
    #[serde(default = "default_offline_message")]
    pub offline_message: String,

    /// Body of the synthesized offline page.
    #[serde(default = "default_offline_html")]
    pub offline_html: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SHELLCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SHELLCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SHELLCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Push notification presentation.
    ///
    /// Nested keys are set via SHELLCACHE_NOTIFICATION__* environment variables.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Fixed fields of every notification shown for a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_title")]
    pub title: String,

    /// Body used when the push message carries no payload.
    #[serde(default = "default_notification_body")]
    pub default_body: String,

    #[serde(default = "default_notification_icon")]
    pub icon: String,

    #[serde(default = "default_notification_badge")]
    pub badge: String,

    /// Vibration pattern in milliseconds (vibrate, pause, vibrate, ...).
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,

    /// Window opened when the notification is clicked.
    #[serde(default = "default_root_document")]
    pub target_url: String,
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_cache_prefix() -> String {
    "rex-ai".into()
}

fn default_version() -> String {
    "v2.0.0".into()
}

fn default_precache_urls() -> Vec<String> {
    [
        "/",
        "/static/style.css",
        "/static/script.js",
        "/static/manifest.json",
        "/static/icon-192.png",
        "/static/icon-512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_dynamic_patterns() -> Vec<String> {
    vec!["/api/".into(), "/prompt".into()]
}

fn default_root_document() -> String {
    "/".into()
}

fn default_offline_message() -> String {
    "Sorry, you are currently offline. Please check your internet connection and try again.".into()
}

fn default_offline_html() -> String {
    "<h1>Offline</h1><p>Please check your internet connection.</p>".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_notification_title() -> String {
    "Rex AI Assistant".into()
}

fn default_notification_body() -> String {
    "New message from Rex AI".into()
}

fn default_notification_icon() -> String {
    "/static/icon-192.png".into()
}

fn default_notification_badge() -> String {
    "/static/icon-72.png".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            default_body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            vibrate: default_vibrate(),
            target_url: default_root_document(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            precache_urls: default_precache_urls(),
            dynamic_patterns: default_dynamic_patterns(),
            root_document: default_root_document(),
            offline_message: default_offline_message(),
            offline_html: default_offline_html(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            notification: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELLCACHE_`
    /// 2. TOML file from `SHELLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Build the immutable routing configuration handed to the gateway.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin does not parse.
    pub fn gateway(&self) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::from_app(self)
    }
}
