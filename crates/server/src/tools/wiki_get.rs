//! wiki_get tool implementation.
//!
//! Returns an article through the cache, fetching from Wikipedia only when
//! the stored copy is missing or stale.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicache_core::{ArticleSource, CacheStatus, Clock, Resolution, WikiCache};

use super::json_result;

/// Input parameters for the wiki_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiGetParams {
    /// Exact article title (case-sensitive).
    pub title: String,
}

/// Output of the wiki_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiGetOutput {
    pub entry_id: i64,
    pub title: String,
    pub content: String,
    pub status: CacheStatus,
    /// Human-readable status line.
    pub message: String,
}

impl From<Resolution> for WikiGetOutput {
    fn from(r: Resolution) -> Self {
        let message = r.message().to_string();
        Self { entry_id: r.entry_id, title: r.title, content: r.content, status: r.status, message }
    }
}

/// Implementation of the wiki_get tool.
pub async fn get_impl<S: ArticleSource, C: Clock>(
    cache: &WikiCache<S, C>, params: WikiGetParams,
) -> Result<CallToolResult, McpError> {
    let resolution = cache.resolve(&params.title).await?;
    json_result(&WikiGetOutput::from(resolution))
}
