//! The environment hosting the gateway: open pages and the notification tray.

use async_trait::async_trait;
use reqwest::Url;
use shellcache_core::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::notify::Notification;

/// Side effects the gateway asks its host to perform.
#[async_trait]
pub trait Host: Send + Sync {
    /// Take control of every open page. Returns how many were claimed.
    async fn claim_clients(&self) -> Result<usize, Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, tag: &str) -> Result<(), Error>;

    /// Open a window at `url`, or focus one already showing it.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}

#[derive(Debug, Default)]
struct Record {
    clients: usize,
    claimed: usize,
    shown: Vec<Notification>,
    active: Vec<String>,
    opened: Vec<Url>,
}

/// Host that logs every request and keeps an in-memory record of it.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    record: Arc<Mutex<Record>>,
}

impl RecordingHost {
    /// A host with `clients` open pages waiting to be claimed.
    pub fn with_clients(clients: usize) -> Self {
        Self { record: Arc::new(Mutex::new(Record { clients, ..Default::default() })) }
    }

    /// Register a newly opened page.
    pub async fn connect_client(&self) {
        self.record.lock().await.clients += 1;
    }

    pub async fn claimed(&self) -> usize {
        self.record.lock().await.claimed
    }

    /// Every notification shown so far, oldest first.
    pub async fn shown(&self) -> Vec<Notification> {
        self.record.lock().await.shown.clone()
    }

    /// Tags of notifications that are shown and not yet closed.
    pub async fn active(&self) -> Vec<String> {
        self.record.lock().await.active.clone()
    }

    pub async fn opened(&self) -> Vec<Url> {
        self.record.lock().await.opened.clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn claim_clients(&self) -> Result<usize, Error> {
        let mut record = self.record.lock().await;
        record.claimed = record.clients;
        tracing::info!(clients = record.claimed, "claimed clients");
        Ok(record.claimed)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        let mut record = self.record.lock().await;
        tracing::debug!(tag = %notification.tag, title = %notification.title, "show notification");
        record.active.push(notification.tag.clone());
        record.shown.push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, tag: &str) -> Result<(), Error> {
        let mut record = self.record.lock().await;
        record.active.retain(|t| t != tag);
        tracing::debug!(%tag, "close notification");
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        let mut record = self.record.lock().await;
        if record.opened.contains(url) {
            tracing::debug!(%url, "focus window");
        } else {
            tracing::info!(%url, "open window");
            record.opened.push(url.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_counts_connected_clients() {
        let host = RecordingHost::with_clients(2);
        host.connect_client().await;
        assert_eq!(host.claim_clients().await.unwrap(), 3);
        assert_eq!(host.claimed().await, 3);
    }

    #[tokio::test]
    async fn test_open_window_focuses_existing() {
        let host = RecordingHost::default();
        let url = Url::parse("http://localhost:8000/").unwrap();
        host.open_window(&url).await.unwrap();
        host.open_window(&url).await.unwrap();
        assert_eq!(host.opened().await, vec![url]);
    }
}
