//! Per-request route classification.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. Cross-origin requests are not intercepted.
//! 2. Non-GET requests are not intercepted.
//! 3. Navigations serve the app shell.
//! 4. Paths containing a dynamic-endpoint pattern go network-first.
//! 5. Everything else is a static asset served cache-first.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use shellcache_core::GatewayConfig;

use super::GatewayRequest;
use crate::fetch::same_origin;

/// Why a request was left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PassReason {
    CrossOrigin,
    NonGet,
    /// The gateway has not finished activating.
    NotControlled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Passthrough(PassReason),
    Navigation,
    Api,
    StaticAsset,
}

/// Classify `request` under `config`.
pub fn classify(config: &GatewayConfig, request: &GatewayRequest) -> Route {
    if !same_origin(&request.url, &config.origin) {
        return Route::Passthrough(PassReason::CrossOrigin);
    }
    if request.method != Method::GET {
        return Route::Passthrough(PassReason::NonGet);
    }
    if request.is_navigation() {
        return Route::Navigation;
    }
    if is_dynamic(config, request) {
        return Route::Api;
    }
    Route::StaticAsset
}

fn is_dynamic(config: &GatewayConfig, request: &GatewayRequest) -> bool {
    let path = request.url.path();
    config.dynamic_patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}
