//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CacheInvalidateParams, DomainFromUrlParams, GetItemParams, TimeAgoParams, TopStoriesParams, UploadContentParams,
    domain_impl, get_item_impl, invalidate_impl, time_ago_impl, top_stories_impl, upload_impl,
};

use pulse_client::{HnApi, Uploader};
use pulse_core::{AppConfig, QueryCache};
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

/// The main MCP server handler for hn-pulse.
#[derive(Clone)]
pub struct HnPulseServer {
    config: Arc<AppConfig>,
    api: Arc<dyn HnApi>,
    cache: QueryCache,
    uploader: Option<Arc<dyn Uploader>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HnPulseServer {
    /// Create a new server handler.
    ///
    /// `uploader` is `None` when no upload endpoint is configured; the
    /// upload tool then reports a configuration error.
    pub fn new(
        config: AppConfig, api: Arc<dyn HnApi>, cache: QueryCache, uploader: Option<Arc<dyn Uploader>>,
    ) -> Self {
        Self { config: Arc::new(config), api, cache, uploader, tool_router: Self::tool_router() }
    }

    /// Ranked stories from a Hacker News feed.
    #[tool(
        description = "Fetch Hacker News stories ranked by score. Returns title, url, domain, score, author and relative age, plus cache staleness."
    )]
    async fn top_stories(&self, params: Parameters<TopStoriesParams>) -> Result<CallToolResult, McpError> {
        top_stories_impl(&self.cache, Arc::clone(&self.api), &self.config, params.0).await
    }

    #[tool(description = "Fetch a single Hacker News item (story, comment, job, poll) by id.")]
    async fn get_item(&self, params: Parameters<GetItemParams>) -> Result<CallToolResult, McpError> {
        get_item_impl(&self.cache, Arc::clone(&self.api), params.0).await
    }

    /// Submit content. Cached story lists are marked stale on success.
    #[tool(description = "Upload a story (title plus url or text). Marks cached story lists stale on success.")]
    async fn upload_content(&self, params: Parameters<UploadContentParams>) -> Result<CallToolResult, McpError> {
        upload_impl(&self.cache, self.uploader.clone(), params.0).await
    }

    #[tool(
        description = "Mark cached queries stale by key prefix, e.g. [\"stories\"]. The next read refreshes them in the background."
    )]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(&self.cache, params.0).await
    }

    #[tool(description = "Extract the host of a URL without a leading www. Returns null for unparseable input.")]
    async fn domain_from_url(&self, params: Parameters<DomainFromUrlParams>) -> Result<CallToolResult, McpError> {
        domain_impl(params.0).await
    }

    #[tool(description = "Format a unix timestamp as a relative age such as \"5m ago\" or \"2d ago\".")]
    async fn time_ago(&self, params: Parameters<TimeAgoParams>) -> Result<CallToolResult, McpError> {
        time_ago_impl(params.0).await
    }
}

impl ServerHandler for HnPulseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "hn-pulse".into(),
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
