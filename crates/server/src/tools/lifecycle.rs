//! Lifecycle tools: gateway_install, gateway_activate, gateway_message and
//! gateway_status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{ActivateOutcome, ControlMessage, EventOutcome, Gateway, GatewayStatus, WorkerEvent};
use shellcache_core::Error;

use super::json_result;

/// Parameters for the gateway_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayMessageParams {
    /// The posted message, e.g. `{"type": "SKIP_WAITING"}`.
    pub message: ControlMessage,
}

/// Output from the gateway_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayMessageOutput {
    /// Set when the message activated an installed version.
    pub activated: Option<ActivateOutcome>,
    pub status: GatewayStatus,
}

pub async fn install_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    let outcome = gateway.install().await?;
    json_result(&outcome)
}

pub async fn activate_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    let outcome = gateway.activate().await?;
    json_result(&outcome)
}

pub async fn message_impl(gateway: &Gateway, params: GatewayMessageParams) -> Result<CallToolResult, McpError> {
    let activated = match gateway.handle(WorkerEvent::Message(params.message)).await? {
        EventOutcome::MessageHandled(activated) => activated,
        other => return Err(Error::InvalidState(format!("unexpected outcome for message: {other:?}")).into()),
    };
    let output = GatewayMessageOutput { activated, status: gateway.status().await };
    json_result(&output)
}

pub async fn status_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    json_result(&gateway.status().await)
}
