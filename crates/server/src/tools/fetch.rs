//! gateway_fetch tool implementation.
//!
//! Sends one request through the gateway and reports how it was answered.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::fetch::canonicalize;
use shellcache_client::{Destination, Gateway, GatewayRequest, GatewayResponse, RequestMode, ResponseSource, Route};
use shellcache_core::Error;
use std::collections::BTreeMap;

use super::json_result;

/// Input parameters for gateway_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode; "navigate" marks a page navigation.
    #[serde(default)]
    pub mode: RequestMode,

    /// What the response will be used for (default: empty).
    #[serde(default)]
    pub destination: Destination,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, sent as UTF-8.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for gateway_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayFetchOutput {
    /// The canonical request URL.
    pub url: String,
    /// How the gateway classified the request.
    pub route: Route,
    pub status: u16,
    pub source: ResponseSource,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Body as text, when it is valid UTF-8.
    pub body: Option<String>,
    /// Body as standard base64, when it is not valid UTF-8.
    pub body_base64: Option<String>,
}

impl GatewayFetchOutput {
    fn new(url: String, route: Route, response: GatewayResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let content_type = response.content_type().map(String::from);
        let (body, body_base64) = match std::str::from_utf8(&response.body) {
            Ok(text) => (Some(text.to_string()), None),
            Err(_) => (None, Some(STANDARD.encode(&response.body))),
        };

        Self { url, route, status: response.status.as_u16(), source: response.source, content_type, headers, body, body_base64 }
    }
}

fn build_request(gateway: &Gateway, params: GatewayFetchParams) -> Result<GatewayRequest, Error> {
    let url = canonicalize(&params.url, &gateway.config().origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = Method::from_bytes(params.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidInput(format!("unsupported method: {}", params.method)))?;

    let mut request = GatewayRequest::new(method, url)
        .with_mode(params.mode)
        .with_destination(params.destination);

    for (name, value) in &params.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("header {name}: {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidInput(format!("header {name}: {e}")))?;
        request.headers.append(name, value);
    }

    if let Some(body) = params.body {
        request = request.with_body(body);
    }
    Ok(request)
}

/// Implementation of the gateway_fetch tool.
pub async fn fetch_impl(gateway: &Gateway, params: GatewayFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = build_request(gateway, params)?;
    let route = gateway.route(&request).await;
    let response = gateway.fetch(&request).await?;

    json_result(&GatewayFetchOutput::new(request.url.to_string(), route, response))
}
