//! Requests entering the gateway.

use bytes::Bytes;
use reqwest::{Method, Url, header::HeaderMap};
use serde::{Deserialize, Serialize};

/// How the page issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load from a tab navigation.
    Navigate,
    #[default]
    SameOrigin,
    NoCors,
    Cors,
}

/// What the requested resource will be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    #[default]
    Empty,
}

/// A request intercepted by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl GatewayRequest {
    pub fn new(method: Method, mut url: Url) -> Self {
        url.set_fragment(None);
        Self {
            method,
            url,
            mode: RequestMode::default(),
            destination: Destination::default(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A sub-resource GET.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// A top-level navigation to `url`.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, destination: Destination::Document, ..Self::get(url) }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}
