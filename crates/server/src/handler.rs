//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl, stores_impl};
use crate::tools::sw_fetch::{SwFetchParams, fetch_impl};
use crate::tools::sw_lifecycle::{activate_impl, install_impl, status_impl};
use crate::tools::sw_message::{SwMessageParams, message_impl};
use waystation_client::Gateway;

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

/// The main MCP server handler for waystation.
#[derive(Clone)]
pub struct WaystationServer {
    tool_router: ToolRouter<Self>,
    gateway: Arc<Gateway>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WaystationServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { tool_router: Self::tool_router(), gateway }
    }

    #[tool(description = "Deliver the install event: precache shell assets (all or nothing) and optional assets.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.gateway).await
    }

    #[tool(description = "Deliver the activate event: delete superseded stores and start intercepting requests.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.gateway).await
    }

    /// Run a request through the fetch interceptor.
    ///
    /// Reports whether the gateway answered it and, if so, which policy and
    /// whether the offline fallback was used.
    #[tool(
        description = "Run a request through the gateway. Returns the caching policy, the response, and whether the offline fallback answered."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Post a control message ({\"type\":\"SKIP_WAITING\"} or {\"type\":\"GET_VERSION\"}) to the gateway.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.gateway, params.0).await
    }

    #[tool(description = "Current version, store name, lifecycle state and flags of the gateway.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.gateway).await
    }

    #[tool(description = "Retrieve the stored response for a request from the current store.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.gateway, params.0).await
    }

    #[tool(description = "List all cache stores with their entry counts.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.gateway).await
    }
}

impl ServerHandler for WaystationServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "waystation".into(),
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
