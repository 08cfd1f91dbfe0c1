//! gateway_push and gateway_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{Gateway, NotificationClick, PushPayload};

use super::json_result;

/// Parameters for the gateway_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayPushParams {
    /// Plain-text push payload. Empty or missing uses the default body.
    #[serde(default)]
    pub text: Option<String>,
}

/// Parameters for the gateway_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayNotificationClickParams {
    /// Tag of the clicked notification.
    pub tag: String,

    /// Action button id ("open", "close"); omit for a click on the body.
    #[serde(default)]
    pub action: Option<String>,

    /// Target URL from the notification data.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output from the gateway_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayNotificationClickOutput {
    /// Window opened or focused, if any.
    pub opened: Option<String>,
}

pub async fn push_impl(gateway: &Gateway, params: GatewayPushParams) -> Result<CallToolResult, McpError> {
    let notification = gateway.push(&PushPayload { text: params.text }).await?;
    json_result(&notification)
}

pub async fn click_impl(
    gateway: &Gateway, params: GatewayNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let click = NotificationClick { tag: params.tag, action: params.action, url: params.url };
    let opened = gateway.notification_click(&click).await?;
    json_result(&GatewayNotificationClickOutput { opened: opened.map(String::from) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{EchoNetwork, gateway, parse};
    use shellcache_client::Notification;

    #[tokio::test]
    async fn test_push_uses_payload_text() {
        let (gateway, host) = gateway(EchoNetwork::default()).await;

        let result = push_impl(&gateway, GatewayPushParams { text: Some("Your answer is ready".into()) }).await.unwrap();
        let notification: Notification = parse(&result);

        assert_eq!(notification.body, "Your answer is ready");
        assert_eq!(notification.title, "Rex AI Assistant");
        assert_eq!(host.active().await, vec![notification.tag]);
    }

    #[tokio::test]
    async fn test_click_open_then_dismiss() {
        let (gateway, host) = gateway(EchoNetwork::default()).await;
        let notification: Notification = parse(&push_impl(&gateway, GatewayPushParams { text: None }).await.unwrap());

        let params = GatewayNotificationClickParams { tag: notification.tag.clone(), action: Some("open".into()), url: None };
        let output: GatewayNotificationClickOutput = parse(&click_impl(&gateway, params).await.unwrap());
        assert_eq!(output.opened.as_deref(), Some("http://localhost:8000/"));
        assert!(host.active().await.is_empty());

        let params = GatewayNotificationClickParams { tag: notification.tag, action: Some("close".into()), url: None };
        let output: GatewayNotificationClickOutput = parse(&click_impl(&gateway, params).await.unwrap());
        assert!(output.opened.is_none());
        assert_eq!(host.opened().await.len(), 1);
    }
}
