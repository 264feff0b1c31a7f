//! wiki_related tool implementation.
//!
//! Fetches an article and every article listed in its "See also" section,
//! then runs each through the cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicache_core::{ArticleSource, Clock, WikiCache};

use super::json_result;
use super::wiki_get::WikiGetOutput;

/// Input parameters for the wiki_related tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiRelatedParams {
    /// Title of the main article.
    pub title: String,
}

/// Output of the wiki_related tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiRelatedOutput {
    pub main_article: WikiGetOutput,
    /// Related articles that could be fetched; failed ones are omitted.
    pub related_articles: Vec<WikiGetOutput>,
}

/// Implementation of the wiki_related tool.
pub async fn related_impl<S: ArticleSource, C: Clock>(
    cache: &WikiCache<S, C>, params: WikiRelatedParams,
) -> Result<CallToolResult, McpError> {
    let resolved = cache.resolve_related(&params.title).await?;
    let output = WikiRelatedOutput {
        main_article: resolved.main.into(),
        related_articles: resolved.related.into_iter().map(WikiGetOutput::from).collect(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticSource, cache, output};

    #[tokio::test]
    async fn test_related_omits_missing_titles() {
        let source = StaticSource::default()
            .with("Tidal Wave", "Waves.\n== See also ==\n* Storm\n* Flood\n== References ==")
            .with("Storm", "Storm text");
        let cache = cache(source).await;

        let result = related_impl(&cache, WikiRelatedParams { title: "Tidal Wave".into() }).await.unwrap();
        let out: WikiRelatedOutput = output(&result);
        assert_eq!(out.main_article.title, "Tidal Wave");
        let related: Vec<_> = out.related_articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(related, ["Storm"]);
        assert_eq!(cache.db().count_entries().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_main_article_fails() {
        let cache = cache(StaticSource::default()).await;
        let err = related_impl(&cache, WikiRelatedParams { title: "Nowhere".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
