//! Push messages and notification clicks.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use shellcache_core::{Error, config::NotificationConfig};

use super::Gateway;

/// Body of a push message. The payload is plain text and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PushPayload {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationData {
    /// Window to open when the notification is clicked.
    pub url: String,
    pub date_of_arrival: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A notification descriptor handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub tag: String,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the descriptor for a push message.
    pub fn for_push(config: &NotificationConfig, payload: &PushPayload) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let body = payload
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&config.default_body)
            .to_string();

        Self {
            tag: format!("push-{now}"),
            title: config.title.clone(),
            body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData { url: config.target_url.clone(), date_of_arrival: now },
            actions: vec![
                NotificationAction { action: "open".into(), title: "Open App".into(), icon: Some(config.icon.clone()) },
                NotificationAction { action: "close".into(), title: "Dismiss".into(), icon: None },
            ],
        }
    }
}

/// Action button the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Open,
    Close,
    Other(String),
}

impl ClickAction {
    /// `None` means the notification body itself was clicked.
    pub fn parse(action: Option<&str>) -> Option<Self> {
        match action? {
            "" => None,
            "open" | "explore" => Some(ClickAction::Open),
            "close" => Some(ClickAction::Close),
            other => Some(ClickAction::Other(other.to_string())),
        }
    }
}

/// A click on a shown notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationClick {
    pub tag: String,
    #[serde(default)]
    pub action: Option<String>,
    /// Target carried in the notification data; defaults to the configured URL.
    #[serde(default)]
    pub url: Option<String>,
}

impl Gateway {
    /// Show a notification for an incoming push message.
    pub async fn push(&self, payload: &PushPayload) -> Result<Notification, Error> {
        let notification = Notification::for_push(&self.config.notification, payload);
        self.host.show_notification(&notification).await?;
        tracing::info!(tag = %notification.tag, "notification shown");
        Ok(notification)
    }

    /// Close the clicked notification and open its target unless dismissed.
    ///
    /// Returns the window URL that was opened, if any.
    pub async fn notification_click(&self, click: &NotificationClick) -> Result<Option<Url>, Error> {
        self.host.close_notification(&click.tag).await?;

        match ClickAction::parse(click.action.as_deref()) {
            None | Some(ClickAction::Open) => {
                let target = click.url.as_deref().unwrap_or(&self.config.notification.target_url);
                let url = self.config.resolve(target)?;
                self.host.open_window(&url).await?;
                Ok(Some(url))
            }
            Some(ClickAction::Close) => Ok(None),
            Some(ClickAction::Other(action)) => {
                tracing::debug!(%action, "ignoring unknown notification action");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{MockNetwork, gateway_with};

    #[test]
    fn test_push_body_defaults() {
        let config = NotificationConfig::default();
        let notification = Notification::for_push(&config, &PushPayload { text: None });
        assert_eq!(notification.body, "New message from Rex AI");
        assert_eq!(notification.title, "Rex AI Assistant");
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.data.url, "/");
        assert_eq!(notification.actions.len(), 2);

        let notification = Notification::for_push(&config, &PushPayload { text: Some("Reply ready".into()) });
        assert_eq!(notification.body, "Reply ready");
    }

    #[test]
    fn test_click_action_parse() {
        assert_eq!(ClickAction::parse(None), None);
        assert_eq!(ClickAction::parse(Some("")), None);
        assert_eq!(ClickAction::parse(Some("open")), Some(ClickAction::Open));
        assert_eq!(ClickAction::parse(Some("explore")), Some(ClickAction::Open));
        assert_eq!(ClickAction::parse(Some("close")), Some(ClickAction::Close));
        assert_eq!(ClickAction::parse(Some("snooze")), Some(ClickAction::Other("snooze".into())));
    }

    #[tokio::test]
    async fn test_push_shows_notification() {
        let (gateway, host) = gateway_with(MockNetwork::new()).await;
        let shown = gateway.push(&PushPayload { text: Some("hello".into()) }).await.unwrap();

        assert_eq!(host.shown().await, vec![shown]);
    }

    #[tokio::test]
    async fn test_click_opens_target() {
        let (gateway, host) = gateway_with(MockNetwork::new()).await;
        let shown = gateway.push(&PushPayload::default()).await.unwrap();

        let click = NotificationClick { tag: shown.tag.clone(), action: None, url: Some("/chat".into()) };
        let opened = gateway.notification_click(&click).await.unwrap();

        assert_eq!(opened.unwrap().as_str(), "http://localhost:8000/chat");
        assert!(host.active().await.is_empty());
        assert_eq!(host.opened().await.len(), 1);
    }

    #[tokio::test]
    async fn test_click_close_only_closes() {
        let (gateway, host) = gateway_with(MockNetwork::new()).await;
        let shown = gateway.push(&PushPayload::default()).await.unwrap();

        let click = NotificationClick { tag: shown.tag, action: Some("close".into()), url: None };
        assert!(gateway.notification_click(&click).await.unwrap().is_none());
        assert!(host.active().await.is_empty());
        assert!(host.opened().await.is_empty());
    }
}
