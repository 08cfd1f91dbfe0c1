//! Fetch routing: picks cache, network or fallback for each request.

use reqwest::Url;
use shellcache_core::Error;

use super::route::{self, PassReason, Route};
use super::{Destination, Gateway, GatewayRequest, GatewayResponse, ResponseSource, WorkerState};

/// What the gateway decided to do with a request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the caller talks to the network directly.
    Passthrough(PassReason),
    Respond(GatewayResponse),
}

impl Gateway {
    /// Classify `request`, treating everything as passthrough until activated.
    pub async fn route(&self, request: &GatewayRequest) -> Route {
        if self.state().await != WorkerState::Activated {
            return Route::Passthrough(PassReason::NotControlled);
        }
        route::classify(&self.config, request)
    }

    /// Decide and produce the response for an intercepted request.
    ///
    /// # Errors
    ///
    /// Only a static asset with no cache entry, whose destination is not a
    /// document, surfaces a network error. Every other failure degrades to a
    /// cached copy or a synthesized fallback.
    pub async fn handle_fetch(&self, request: &GatewayRequest) -> Result<FetchOutcome, Error> {
        let response = match self.route(request).await {
            Route::Passthrough(reason) => {
                tracing::trace!(url = %request.url, ?reason, "not intercepted");
                return Ok(FetchOutcome::Passthrough(reason));
            }
            Route::Navigation => self.serve_navigation().await?,
            Route::Api => self.serve_network_first(request).await,
            Route::StaticAsset => self.serve_cache_first(request).await?,
        };
        Ok(FetchOutcome::Respond(response))
    }

    /// Like [`Gateway::handle_fetch`], but fetches passthrough requests directly.
    pub async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, Error> {
        match self.handle_fetch(request).await? {
            FetchOutcome::Respond(response) => Ok(response),
            FetchOutcome::Passthrough(_) => {
                let response = self.network.fetch(request).await?;
                Ok(GatewayResponse::from_network(response, &self.config.origin, ResponseSource::Passthrough))
            }
        }
    }

    /// App shell first, then the live root document, then the offline page.
    async fn serve_navigation(&self) -> Result<GatewayResponse, Error> {
        let root = self.config.root_url()?;

        if let Some(shell) = self.cached_root(&[self.config.names.precache.as_str()]).await {
            return Ok(shell);
        }

        match self.network.fetch(&GatewayRequest::navigate(root.clone())).await {
            Ok(response) => Ok(GatewayResponse::from_network(response, &self.config.origin, ResponseSource::Network)),
            Err(e) => {
                tracing::warn!(url = %root, error = %e, "navigation offline, serving fallback page");
                Ok(GatewayResponse::html_fallback(&self.config.offline_html))
            }
        }
    }

    /// Always hit the network; never read or write the cache.
    async fn serve_network_first(&self, request: &GatewayRequest) -> GatewayResponse {
        match self.network.fetch(request).await {
            Ok(response) => GatewayResponse::from_network(response, &self.config.origin, ResponseSource::Network),
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "dynamic endpoint offline, serving fallback");
                GatewayResponse::json_fallback(&self.config.offline_message)
            }
        }
    }

    async fn serve_cache_first(&self, request: &GatewayRequest) -> Result<GatewayResponse, Error> {
        if let Some(hit) = self.lookup(&self.config.names.all(), &request.url).await {
            tracing::debug!(url = %request.url, source = ?hit.source, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(url = %request.url, "cache miss");

        match self.network.fetch(request).await {
            Ok(response) => {
                let response = GatewayResponse::from_network(response, &self.config.origin, ResponseSource::Network);
                if response.is_cacheable() {
                    self.persist_in_background(response.to_cached(&self.config.names.runtime, &request.url));
                }
                Ok(response)
            }
            Err(e) if request.destination == Destination::Document => {
                tracing::warn!(url = %request.url, error = %e, "document offline, serving shell");
                let fallback = self.cached_root(&self.config.names.all()).await;
                Ok(fallback.unwrap_or_else(|| GatewayResponse::html_fallback(&self.config.offline_html)))
            }
            Err(e) => Err(e),
        }
    }

    async fn cached_root(&self, partitions: &[&str]) -> Option<GatewayResponse> {
        let root = self.config.root_url().ok()?;
        self.lookup(partitions, &root).await
    }

    /// Cache lookup that treats storage errors as misses.
    async fn lookup(&self, partitions: &[&str], url: &Url) -> Option<GatewayResponse> {
        let entry = match self.cache.match_first(partitions, url.as_str()).await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!(%url, error = %e, "cache read failed");
                return None;
            }
        };

        let source =
            if entry.partition == self.config.names.precache { ResponseSource::Precache } else { ResponseSource::Runtime };
        match GatewayResponse::from_cached(entry, source) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(%url, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }
}
