//! The offline cache gateway.
//!
//! One `Gateway` is one worker version: an immutable [`GatewayConfig`], the
//! shared cache storage, and seams for the network and the host.
//!
//! ### Lifecycle
//! - `install` precaches the app shell (all-or-nothing).
//! - `activate` deletes partitions from other versions and claims clients.
//! - Requests are routed only once activated.
//!
//! ### Routing
//! - Cross-origin and non-GET requests pass through untouched.
//! - Navigations get the precached shell, then the live root, then an offline page.
//! - Dynamic endpoints are network-first with a JSON fallback.
//! - Static assets are cache-first with read-through into the runtime partition.

mod event;
mod host;
mod lifecycle;
mod notify;
mod request;
mod response;
pub mod route;
mod router;
mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shellcache_core::{CacheDb, CacheNames, CachedResponse, GatewayConfig};
use tokio::sync::RwLock;
use tokio_util::task::TaskTracker;

use crate::fetch::Network;

pub use event::{ControlMessage, EventOutcome, SyncTag, WorkerEvent};
pub use host::{Host, RecordingHost};
pub use lifecycle::{ActivateOutcome, InstallOutcome, WorkerState};
pub use notify::{ClickAction, Notification, NotificationAction, NotificationClick, NotificationData, PushPayload};
pub use request::{Destination, GatewayRequest, RequestMode};
pub use response::{GatewayResponse, ResponseSource, ResponseType};
pub use route::{PassReason, Route};
pub use router::FetchOutcome;
pub use sync::{NoopQueue, OfflineAction, OfflineQueue};

use lifecycle::Lifecycle;

/// Snapshot of a gateway's version and lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GatewayStatus {
    pub version: String,
    pub state: WorkerState,
    pub skip_waiting: bool,
    pub partitions: CacheNames,
    /// Runtime cache writes still in flight.
    pub pending_writes: usize,
}

pub struct Gateway {
    config: Arc<GatewayConfig>,
    cache: CacheDb,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    queue: Arc<dyn OfflineQueue>,
    lifecycle: RwLock<Lifecycle>,
    writes: TaskTracker,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig, cache: CacheDb, network: impl Network + 'static, host: impl Host + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            network: Arc::new(network),
            host: Arc::new(host),
            queue: Arc::new(NoopQueue),
            lifecycle: RwLock::new(Lifecycle::default()),
            writes: TaskTracker::new(),
        }
    }

    /// Replace the queue drained by background sync.
    pub fn with_offline_queue(mut self, queue: impl OfflineQueue + 'static) -> Self {
        self.queue = Arc::new(queue);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    pub async fn status(&self) -> GatewayStatus {
        let lifecycle = self.lifecycle.read().await;
        GatewayStatus {
            version: self.config.version.clone(),
            state: lifecycle.state,
            skip_waiting: lifecycle.skip_waiting,
            partitions: self.config.names.clone(),
            pending_writes: self.writes.len(),
        }
    }

    /// Store a runtime cache entry without holding up the response.
    ///
    /// Failures are logged and dropped; the page already has its copy.
    fn persist_in_background(&self, entry: CachedResponse) {
        let cache = self.cache.clone();
        self.writes.spawn(async move {
            match cache.put_entry(&entry).await {
                Ok(()) => tracing::debug!(url = %entry.url, partition = %entry.partition, "cached"),
                Err(e) => tracing::warn!(url = %entry.url, error = %e, "runtime cache write failed"),
            }
        });
    }

    /// Wait until every background cache write has finished.
    pub async fn settle(&self) {
        self.writes.close();
        self.writes.wait().await;
        self.writes.reopen();
    }
}
