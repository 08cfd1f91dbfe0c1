//! Test doubles for the network seam.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url, header};
use shellcache_core::{CacheDb, Error, GatewayConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Gateway, GatewayRequest, RecordingHost};
use crate::fetch::{FetchResponse, Network};

pub(crate) const ORIGIN: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    final_url: Option<Url>,
    body: &'static str,
}

/// Canned responses keyed by URL. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockNetwork {
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    calls: Arc<Mutex<Vec<String>>>,
    offline: Arc<AtomicBool>,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn absolute(path: &str) -> String {
        format!("{ORIGIN}{path}")
    }

    pub(crate) fn with(self, path: &str, status: u16, body: &'static str) -> Self {
        self.routes.lock().unwrap().insert(Self::absolute(path), Canned { status, final_url: None, body });
        self
    }

    /// Answer `path` as if it redirected to `final_url`.
    pub(crate) fn with_redirect(self, path: &str, final_url: &str, body: &'static str) -> Self {
        let final_url = Some(Url::parse(final_url).unwrap());
        self.routes.lock().unwrap().insert(Self::absolute(path), Canned { status: 200, final_url, body });
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests seen so far as `"METHOD url"`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &GatewayRequest) -> Result<FetchResponse, Error> {
        self.calls.lock().unwrap().push(format!("{} {}", request.method, request.url));

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: connection refused", request.url)));
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        let (status, final_url, body) = match route {
            Some(route) => (route.status, route.final_url.unwrap_or_else(|| request.url.clone()), route.body),
            None => (404, request.url.clone(), "not found"),
        };

        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));
        Ok(FetchResponse {
            url: request.url.clone(),
            final_url,
            status: StatusCode::from_u16(status).unwrap(),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(body.as_bytes()),
            headers,
            fetch_ms: 0,
        })
    }
}

pub(crate) fn test_config() -> GatewayConfig {
    GatewayConfig::for_origin(Url::parse(ORIGIN).unwrap())
}

pub(crate) async fn gateway_with(network: MockNetwork) -> (Gateway, RecordingHost) {
    gateway_with_config(test_config(), network).await
}

pub(crate) async fn gateway_with_config(config: GatewayConfig, network: MockNetwork) -> (Gateway, RecordingHost) {
    let cache = CacheDb::open_in_memory().await.unwrap();
    let host = RecordingHost::default();
    (Gateway::new(config, cache, network, host.clone()), host)
}

/// A gateway that has installed and activated `config`.
pub(crate) async fn activated_gateway(config: GatewayConfig, network: MockNetwork) -> Gateway {
    let (gateway, _host) = gateway_with_config(config, network).await;
    gateway.start().await.unwrap();
    gateway
}
