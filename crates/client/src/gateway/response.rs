//! Responses produced by the gateway.
//!
//! Bodies are always fully buffered. Persisting a response copies the body
//! into the cache entry, so the copy returned to the page and the stored copy
//! never share a reader.

use bytes::Bytes;
use reqwest::{
    StatusCode, Url,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use shellcache_core::{CachedResponse, Error};

use crate::fetch::{FetchResponse, same_origin};

/// Response tainting, as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin network response.
    Basic,
    /// Network response that ended on another origin.
    Cors,
    /// Synthesized by the gateway.
    Default,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Default => "default",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(ResponseType::Basic),
            "cors" => Some(ResponseType::Cors),
            "default" => Some(ResponseType::Default),
            _ => None,
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Precache,
    Runtime,
    Network,
    Fallback,
    /// Not intercepted; fetched directly on behalf of the page.
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub response_type: ResponseType,
    pub source: ResponseSource,
}

impl GatewayResponse {
    /// Wrap a live response, tainting it by the origin it ended on.
    pub fn from_network(response: FetchResponse, origin: &Url, source: ResponseSource) -> Self {
        let response_type =
            if same_origin(&response.final_url, origin) { ResponseType::Basic } else { ResponseType::Cors };
        Self { status: response.status, headers: response.headers, body: response.bytes, response_type, source }
    }

    /// Rebuild a response from a stored entry.
    pub fn from_cached(entry: CachedResponse, source: ResponseSource) -> Result<Self, Error> {
        let status = StatusCode::from_u16(entry.status)
            .map_err(|_| Error::CorruptEntry(format!("{}: status {}", entry.url, entry.status)))?;
        let response_type = ResponseType::parse(&entry.response_type)
            .ok_or_else(|| Error::CorruptEntry(format!("{}: response type {}", entry.url, entry.response_type)))?;

        let mut headers = HeaderMap::with_capacity(entry.headers.len());
        for (name, value) in &entry.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::CorruptEntry(format!("{}: header {name}: {e}", entry.url)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::CorruptEntry(format!("{}: header {name}: {e}", entry.url)))?;
            headers.append(name, value);
        }

        Ok(Self { status, headers, body: Bytes::from(entry.body), response_type, source })
    }

    /// Copy this response into a cache entry for `url` in `partition`.
    ///
    /// Headers that are not valid UTF-8 are dropped.
    pub fn to_cached(&self, partition: &str, url: &Url) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        CachedResponse::new(
            partition,
            url.as_str(),
            self.status.as_u16(),
            headers,
            self.body.to_vec(),
            self.response_type.as_str(),
        )
    }

    /// JSON fallback for dynamic endpoints: `{ "response": message }`.
    pub fn json_fallback(message: &str) -> Self {
        let body = serde_json::json!({ "response": message }).to_string();
        Self::synthesized("application/json", body)
    }

    /// HTML fallback for documents.
    pub fn html_fallback(html: &str) -> Self {
        Self::synthesized("text/html; charset=utf-8", html.to_string())
    }

    fn synthesized(content_type: &'static str, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body),
            response_type: ResponseType::Default,
            source: ResponseSource::Fallback,
        }
    }

    /// Only complete same-origin responses are written to the runtime cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && self.response_type == ResponseType::Basic
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_response(final_url: &str, status: StatusCode) -> FetchResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));
        FetchResponse {
            url: Url::parse("http://localhost:8000/static/style.css").unwrap(),
            final_url: Url::parse(final_url).unwrap(),
            status,
            content_type: Some("text/css".into()),
            bytes: Bytes::from_static(b"body{}"),
            headers,
            fetch_ms: 3,
        }
    }

    fn origin() -> Url {
        Url::parse("http://localhost:8000").unwrap()
    }

    #[test]
    fn test_network_response_tainting() {
        let basic = GatewayResponse::from_network(
            network_response("http://localhost:8000/static/style.css", StatusCode::OK),
            &origin(),
            ResponseSource::Network,
        );
        assert_eq!(basic.response_type, ResponseType::Basic);
        assert!(basic.is_cacheable());

        let redirected = GatewayResponse::from_network(
            network_response("https://cdn.example/style.css", StatusCode::OK),
            &origin(),
            ResponseSource::Network,
        );
        assert_eq!(redirected.response_type, ResponseType::Cors);
        assert!(!redirected.is_cacheable());
    }

    #[test]
    fn test_non_200_not_cacheable() {
        let partial = GatewayResponse::from_network(
            network_response("http://localhost:8000/static/style.css", StatusCode::PARTIAL_CONTENT),
            &origin(),
            ResponseSource::Network,
        );
        assert!(!partial.is_cacheable());
    }

    #[test]
    fn test_cached_copy_is_independent() {
        let url = Url::parse("http://localhost:8000/static/style.css").unwrap();
        let response = GatewayResponse::from_network(
            network_response(url.as_str(), StatusCode::OK),
            &origin(),
            ResponseSource::Network,
        );

        let entry = response.to_cached("runtime-v1", &url);
        assert_eq!(entry.body, b"body{}");
        assert_eq!(entry.response_type, "basic");

        let restored = GatewayResponse::from_cached(entry, ResponseSource::Runtime).unwrap();
        assert_eq!(restored.body, response.body);
        assert_eq!(restored.content_type(), Some("text/css"));
        assert_eq!(restored.source, ResponseSource::Runtime);
    }

    #[test]
    fn test_from_cached_rejects_bad_status() {
        let mut entry = CachedResponse::new("p", "http://localhost:8000/", 200, Vec::new(), Vec::new(), "basic");
        entry.status = 42;
        assert!(matches!(
            GatewayResponse::from_cached(entry, ResponseSource::Precache),
            Err(Error::CorruptEntry(_))
        ));
    }

    #[test]
    fn test_json_fallback_shape() {
        let response = GatewayResponse::json_fallback("offline");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.source, ResponseSource::Fallback);
        assert_eq!(response.content_type(), Some("application/json"));
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body, serde_json::json!({ "response": "offline" }));
    }

    #[test]
    fn test_html_fallback() {
        let response = GatewayResponse::html_fallback("<h1>Offline</h1>");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "<h1>Offline</h1>");
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    }
}
