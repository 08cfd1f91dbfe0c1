//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the gateway.
use crate::tools::{
    CacheListParams, CachePurgeParams, GatewayFetchParams, GatewayMessageParams, GatewayNotificationClickParams,
    GatewayPushParams, GatewaySyncParams, cache, fetch, lifecycle, notify, sync,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellcache_client::Gateway;
use std::sync::Arc;

/// The main MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellcacheServer {
    gateway: Arc<Gateway>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ShellcacheServer {
    /// Create a server handler around one gateway version.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, tool_router: Self::tool_router() }
    }

    /// Send a request through the gateway.
    #[tool(
        description = "Send a request through the offline gateway. Returns status, headers, body, the route it took and whether it came from cache, network or a fallback."
    )]
    async fn gateway_fetch(&self, params: Parameters<GatewayFetchParams>) -> Result<CallToolResult, McpError> {
        fetch::fetch_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Run the install phase: precache the app shell. Fails without writing anything if any URL fails.")]
    async fn gateway_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.gateway).await
    }

    #[tool(description = "Run the activate phase: delete partitions of other versions and claim open pages.")]
    async fn gateway_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.gateway).await
    }

    #[tool(description = "Post a control message to the gateway, e.g. {\"type\": \"SKIP_WAITING\"}.")]
    async fn gateway_message(&self, params: Parameters<GatewayMessageParams>) -> Result<CallToolResult, McpError> {
        lifecycle::message_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Report the gateway version, lifecycle state and pending cache writes.")]
    async fn gateway_status(&self) -> Result<CallToolResult, McpError> {
        lifecycle::status_impl(&self.gateway).await
    }

    #[tool(description = "Deliver a push message. Shows a notification with the payload text as its body.")]
    async fn gateway_push(&self, params: Parameters<GatewayPushParams>) -> Result<CallToolResult, McpError> {
        notify::push_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Click a shown notification or one of its actions. Opens the app unless dismissed.")]
    async fn gateway_notification_click(
        &self, params: Parameters<GatewayNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        notify::click_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Fire a sync event. The background-sync tag replays actions queued while offline.")]
    async fn gateway_sync(&self, params: Parameters<GatewaySyncParams>) -> Result<CallToolResult, McpError> {
        sync::sync_impl(&self.gateway, params.0).await
    }

    #[tool(description = "List cache partitions with entry counts, or the entries of one partition.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        cache::list_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Delete a cache partition, one entry by key, or all partitions of other versions.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.gateway, params.0).await
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
