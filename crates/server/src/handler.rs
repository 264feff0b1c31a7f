//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::tools::wiki_entries::{WikiEntriesParams, entries_impl};
use crate::tools::wiki_get::{WikiGetParams, get_impl};
use crate::tools::wiki_logs::{WikiLogsParams, logs_impl};
use crate::tools::wiki_markdown::{WikiMarkdownParams, markdown_impl};
use crate::tools::wiki_related::{WikiRelatedParams, related_impl};

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
use wikicache_client::WikipediaClient;
use wikicache_core::WikiCache;

/// Engine backed by the live Wikipedia API.
pub type Engine = WikiCache<WikipediaClient>;

/// The main MCP server handler for wikicache.
#[derive(Clone)]
pub struct WikiCacheServer {
    cache: Arc<Engine>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl WikiCacheServer {
    /// Create a new server handler.
    pub fn new(cache: Arc<Engine>) -> Self {
        Self { cache, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Get a Wikipedia article by exact title. Served from the local cache when fetched within the freshness window, otherwise fetched and stored. Returns plain-text content and cache status."
    )]
    async fn wiki_get(&self, params: Parameters<WikiGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.cache.as_ref(), params.0).await
    }

    #[tool(
        description = "Get a Wikipedia article plus every article listed in its 'See also' section. Related articles that cannot be fetched are omitted."
    )]
    async fn wiki_related(&self, params: Parameters<WikiRelatedParams>) -> Result<CallToolResult, McpError> {
        related_impl(self.cache.as_ref(), params.0).await
    }

    #[tool(
        description = "Query the cache audit log, newest first. Filter by title and/or action type (check, update, create). Includes hit and update counts."
    )]
    async fn wiki_logs(&self, params: Parameters<WikiLogsParams>) -> Result<CallToolResult, McpError> {
        logs_impl(self.cache.db(), params.0).await
    }

    #[tool(description = "Convert wiki markup to Markdown, from raw text or from a stored entry id. No network requests.")]
    async fn wiki_markdown(&self, params: Parameters<WikiMarkdownParams>) -> Result<CallToolResult, McpError> {
        markdown_impl(self.cache.db(), params.0).await
    }

    #[tool(description = "List cached articles, most recently modified first, with staleness flags.")]
    async fn wiki_entries(&self, params: Parameters<WikiEntriesParams>) -> Result<CallToolResult, McpError> {
        entries_impl(self.cache.db(), self.cache.policy(), self.cache.now(), params.0).await
    }
}

impl ServerHandler for WikiCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "wikicache".into(),
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
