//! wiki_logs tool implementation.
//!
//! Read-only view of the cache decision audit log.

use std::str::FromStr;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicache_core::{ActionType, CacheDb, LogQuery, LogSummary, WikiEntryLog};

use super::json_result;

/// Input parameters for the wiki_logs tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WikiLogsParams {
    /// Only rows for this exact title.
    #[serde(default)]
    pub title: Option<String>,

    /// Only rows of this action: check, update, or create.
    #[serde(default)]
    pub action_type: Option<String>,

    /// Maximum number of rows (default 20).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output of the wiki_logs tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiLogsOutput {
    pub logs: Vec<WikiEntryLog>,
    pub summary: LogSummary,
}

/// Implementation of the wiki_logs tool.
pub async fn logs_impl(db: &CacheDb, params: WikiLogsParams) -> Result<CallToolResult, McpError> {
    let action_type = params.action_type.as_deref().map(ActionType::from_str).transpose()?;
    let query = LogQuery { title: params.title, action_type, limit: params.limit };

    let logs = db.query_logs(&query).await?;
    let summary = LogSummary::from_logs(&logs);
    json_result(&WikiLogsOutput { logs, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticSource, cache, output};

    #[tokio::test]
    async fn test_logs_with_summary() {
        let cache = cache(StaticSource::default().with("Cat", "c").with("Dog", "d")).await;
        cache.resolve("Cat").await.unwrap();
        cache.resolve("Cat").await.unwrap();
        cache.resolve("Dog").await.unwrap();

        let result = logs_impl(cache.db(), WikiLogsParams::default()).await.unwrap();
        let out: WikiLogsOutput = output(&result);
        assert_eq!(out.logs.len(), 3);
        assert_eq!(out.summary, LogSummary { total: 3, cache_hits: 1, updates: 2 });

        let params = WikiLogsParams { title: Some("Cat".into()), action_type: Some("CHECK".into()), limit: None };
        let out: WikiLogsOutput = output(&logs_impl(cache.db(), params).await.unwrap());
        assert_eq!(out.logs.len(), 1);
        assert_eq!(out.logs[0].action_type, ActionType::Check);
    }

    #[tokio::test]
    async fn test_unknown_action_type() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let params = WikiLogsParams { action_type: Some("purge".into()), ..Default::default() };
        let err = logs_impl(&db, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
