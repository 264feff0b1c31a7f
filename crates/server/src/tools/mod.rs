//! MCP tool implementations.
//!
//! This module contains all tools exposed by the wikicache server.

pub mod wiki_entries;
pub mod wiki_get;
pub mod wiki_logs;
pub mod wiki_markdown;
pub mod wiki_related;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use wikicache_core::Error;

/// Pretty-printed JSON tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize tool output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use wikicache_core::{AppConfig, ArticleSource, CacheDb, FetchError, WikiCache};

    /// Fixed set of upstream articles.
    #[derive(Default)]
    pub struct StaticSource(HashMap<String, String>);

    impl StaticSource {
        pub fn with(mut self, title: &str, content: &str) -> Self {
            self.0.insert(title.to_string(), content.to_string());
            self
        }
    }

    #[async_trait]
    impl ArticleSource for StaticSource {
        async fn fetch_article(&self, title: &str) -> Result<String, FetchError> {
            self.0
                .get(title)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(title.to_string()))
        }
    }

    pub async fn cache(source: StaticSource) -> WikiCache<StaticSource> {
        let db = CacheDb::open_in_memory().await.unwrap();
        WikiCache::new(db, source, &AppConfig::default())
    }

    /// Decode the JSON text of the first content item.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
