//! wiki_markdown tool implementation.
//!
//! Converts wiki markup to Markdown. Either pass raw `text`, or the id of a
//! stored entry whose content should be rendered. No network requests are made.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicache_client::to_markdown;
use wikicache_core::{CacheDb, Error};

use super::json_result;

/// Input parameters for the wiki_markdown tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WikiMarkdownParams {
    /// Raw wiki markup to convert.
    #[serde(default)]
    pub text: Option<String>,

    /// Id of a stored entry to convert instead of `text`.
    #[serde(default)]
    pub entry_id: Option<i64>,
}

/// Output of the wiki_markdown tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiMarkdownOutput {
    pub markdown: String,
}

/// Implementation of the wiki_markdown tool.
pub async fn markdown_impl(db: &CacheDb, params: WikiMarkdownParams) -> Result<CallToolResult, McpError> {
    let text = match (params.text, params.entry_id) {
        (Some(text), None) => text,
        (None, Some(id)) => db.get_entry(id).await?.ok_or(Error::EntryNotFound(id))?.content,
        _ => return Err(Error::InvalidInput("provide exactly one of text or entry_id".into()).into()),
    };

    json_result(&WikiMarkdownOutput { markdown: to_markdown(&text) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;
    use chrono::Utc;

    #[tokio::test]
    async fn test_converts_text() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let params = WikiMarkdownParams { text: Some("== Intro ==\n[[Cat|cats]]".into()), entry_id: None };

        let out: WikiMarkdownOutput = output(&markdown_impl(&db, params).await.unwrap());
        assert_eq!(out.markdown, "## Intro\n[cats](Cat)");
    }

    #[tokio::test]
    async fn test_converts_stored_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let stored = db.store_fetched("Cat", "'''Cats''' purr.", Utc::now()).await.unwrap();

        let params = WikiMarkdownParams { text: None, entry_id: Some(stored.entry.id) };
        let out: WikiMarkdownOutput = output(&markdown_impl(&db, params).await.unwrap());
        assert_eq!(out.markdown, "**Cats** purr.");
    }

    #[tokio::test]
    async fn test_requires_exactly_one_input() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let err = markdown_impl(&db, WikiMarkdownParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32602);

        let err = markdown_impl(&db, WikiMarkdownParams { text: None, entry_id: Some(42) }).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
