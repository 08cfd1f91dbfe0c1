//! Event dispatch over the closed set of worker events.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use shellcache_core::Error;

use super::{
    ActivateOutcome, Gateway, GatewayRequest, GatewayResponse, InstallOutcome, Notification, NotificationClick,
    PushPayload,
};

/// Messages a page may post to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate an installed version without waiting for old pages to close.
    SkipWaiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTag {
    /// Replay actions queued while offline.
    BackgroundSync,
    Other(String),
}

impl SyncTag {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "background-sync" => SyncTag::BackgroundSync,
            other => SyncTag::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(GatewayRequest),
    Message(ControlMessage),
    Sync(SyncTag),
    Push(PushPayload),
    NotificationClick(NotificationClick),
}

#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed(InstallOutcome),
    Activated(ActivateOutcome),
    Responded(GatewayResponse),
    /// Carries the activation a skip-waiting message triggered, if any.
    MessageHandled(Option<ActivateOutcome>),
    Synced { processed: usize },
    NotificationShown(Notification),
    NotificationClicked { opened: Option<Url> },
}

impl Gateway {
    /// Run the handler for `event` to completion.
    pub async fn handle(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => self.fetch(&request).await.map(EventOutcome::Responded),
            WorkerEvent::Message(ControlMessage::SkipWaiting) => {
                self.skip_waiting().await.map(EventOutcome::MessageHandled)
            }
            WorkerEvent::Sync(tag) => {
                let processed = self.sync(&tag).await?;
                Ok(EventOutcome::Synced { processed })
            }
            WorkerEvent::Push(payload) => self.push(&payload).await.map(EventOutcome::NotificationShown),
            WorkerEvent::NotificationClick(click) => {
                let opened = self.notification_click(&click).await?;
                Ok(EventOutcome::NotificationClicked { opened })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{MockNetwork, gateway_with_config, test_config};
    use crate::gateway::{ResponseSource, WorkerState};

    #[test]
    fn test_control_message_wire_format() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(msg, ControlMessage::SkipWaiting);
        assert!(serde_json::from_str::<ControlMessage>(r#"{"type":"RELOAD"}"#).is_err());
    }

    #[test]
    fn test_sync_tag_parse() {
        assert_eq!(SyncTag::parse("background-sync"), SyncTag::BackgroundSync);
        assert_eq!(SyncTag::parse("periodic"), SyncTag::Other("periodic".into()));
    }

    #[tokio::test]
    async fn test_install_activate_then_serve_shell() {
        let network = MockNetwork::new()
            .with("/", 200, "<html>shell</html>")
            .with("/static/style.css", 200, "body{}");
        let config = test_config().with_precache_urls(["/", "/static/style.css"]);
        let (gateway, _host) = gateway_with_config(config, network.clone()).await;

        assert!(matches!(gateway.handle(WorkerEvent::Install).await.unwrap(), EventOutcome::Installed(_)));
        assert!(matches!(gateway.handle(WorkerEvent::Activate).await.unwrap(), EventOutcome::Activated(_)));
        network.reset_calls();

        let root = Url::parse("http://localhost:8000/").unwrap();
        let outcome = gateway.handle(WorkerEvent::Fetch(GatewayRequest::get(root))).await.unwrap();

        let EventOutcome::Responded(response) = outcome else { panic!("expected a response") };
        assert_eq!(response.text(), "<html>shell</html>");
        assert_eq!(response.source, ResponseSource::Precache);
        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_stats_returns_json_fallback() {
        let network = MockNetwork::new().with("/", 200, "shell");
        let (gateway, _host) = gateway_with_config(test_config().with_precache_urls(["/"]), network.clone()).await;
        gateway.start().await.unwrap();
        network.set_offline(true);

        let stats = Url::parse("http://localhost:8000/api/stats").unwrap();
        let outcome = gateway.handle(WorkerEvent::Fetch(GatewayRequest::get(stats))).await.unwrap();

        let EventOutcome::Responded(response) = outcome else { panic!("expected a response") };
        assert_eq!(response.status.as_u16(), 200);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "response": "Sorry, you are currently offline. Please check your internet connection and try again."
            })
        );
    }

    #[tokio::test]
    async fn test_skip_waiting_message() {
        let network = MockNetwork::new().with("/", 200, "shell");
        let (gateway, _host) = gateway_with_config(test_config().with_precache_urls(["/"]), network).await;
        gateway.handle(WorkerEvent::Install).await.unwrap();

        let outcome = gateway.handle(WorkerEvent::Message(ControlMessage::SkipWaiting)).await.unwrap();
        assert!(matches!(outcome, EventOutcome::MessageHandled(Some(_))));
        assert_eq!(gateway.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_background_sync_with_default_queue() {
        let (gateway, _host) = gateway_with_config(test_config(), MockNetwork::new()).await;
        let outcome = gateway.handle(WorkerEvent::Sync(SyncTag::BackgroundSync)).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Synced { processed: 0 }));
    }
}
