//! gateway_sync tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{Gateway, SyncTag};
use shellcache_core::Error;

use super::json_result;

/// Parameters for the gateway_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewaySyncParams {
    /// Sync tag (default: "background-sync"). Other tags are ignored.
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_tag() -> String {
    "background-sync".into()
}

/// Output from the gateway_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewaySyncOutput {
    pub tag: String,
    /// Offline actions replayed.
    pub processed: usize,
}

pub async fn sync_impl(gateway: &Gateway, params: GatewaySyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(Error::InvalidInput("tag cannot be empty".into()).into());
    }

    let processed = gateway.sync(&SyncTag::parse(&params.tag)).await?;
    json_result(&GatewaySyncOutput { tag: params.tag, processed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{EchoNetwork, gateway, parse};

    #[tokio::test]
    async fn test_sync_default_queue_is_empty() {
        let (gateway, _host) = gateway(EchoNetwork::default()).await;
        let params: GatewaySyncParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.tag, "background-sync");

        let output: GatewaySyncOutput = parse(&sync_impl(&gateway, params).await.unwrap());
        assert_eq!(output.processed, 0);
    }

    #[tokio::test]
    async fn test_sync_rejects_empty_tag() {
        let (gateway, _host) = gateway(EchoNetwork::default()).await;
        let result = sync_impl(&gateway, GatewaySyncParams { tag: " ".into() }).await;
        assert!(result.is_err());
    }
}
