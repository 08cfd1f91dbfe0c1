//! Background sync: replaying actions the page queued while offline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shellcache_core::Error;

use super::{Gateway, SyncTag};

/// An action recorded while offline, waiting to be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OfflineAction {
    pub id: String,
    pub payload: serde_json::Value,
}

/// Storage and replay for offline actions.
#[async_trait]
pub trait OfflineQueue: Send + Sync {
    async fn pending(&self) -> Result<Vec<OfflineAction>, Error>;

    async fn process(&self, action: &OfflineAction) -> Result<(), Error>;

    /// Drop every action that has been processed.
    async fn clear(&self) -> Result<(), Error>;
}

/// A queue that never has anything pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueue;

#[async_trait]
impl OfflineQueue for NoopQueue {
    async fn pending(&self) -> Result<Vec<OfflineAction>, Error> {
        Ok(Vec::new())
    }

    async fn process(&self, _action: &OfflineAction) -> Result<(), Error> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl Gateway {
    /// Handle a sync event. Only `background-sync` drains the offline queue.
    ///
    /// Returns the number of actions replayed. The queue is cleared only when
    /// every action succeeded, so a failure leaves everything for the next sync.
    /// A failed replay is returned to the caller rather than only logged, so
    /// the host can reschedule the sync.
    pub async fn sync(&self, tag: &SyncTag) -> Result<usize, Error> {
        if let SyncTag::Other(tag) = tag {
            tracing::debug!(%tag, "ignoring sync tag");
            return Ok(0);
        }

        let pending = self.queue.pending().await?;
        tracing::info!(pending = pending.len(), "background sync started");

        for action in &pending {
            if let Err(e) = self.queue.process(action).await {
                tracing::warn!(id = %action.id, error = %e, "offline action failed, keeping queue");
                return Err(e);
            }
        }
        self.queue.clear().await?;

        tracing::info!(processed = pending.len(), "background sync finished");
        Ok(pending.len())
    }
}
