//! MCP tool implementations.
//!
//! This module contains all tools exposed by the shellcache server. Each tool
//! returns its output as pretty-printed JSON text content.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod notify;
pub mod sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellcache_core::Error;

pub use cache::{CacheListParams, CachePurgeParams};
pub use fetch::GatewayFetchParams;
pub use lifecycle::GatewayMessageParams;
pub use notify::{GatewayNotificationClickParams, GatewayPushParams};
pub use sync::GatewaySyncParams;

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
