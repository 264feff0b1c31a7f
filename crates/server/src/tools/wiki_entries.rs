//! wiki_entries tool implementation.
//!
//! Lists stored entries without their content.

use chrono::{DateTime, Utc};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicache_core::{CacheDb, FreshnessPolicy};

use super::json_result;

/// Input parameters for the wiki_entries tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WikiEntriesParams {
    /// Maximum number of entries, most recently modified first.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One stored entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntryItem {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Whether the next lookup would re-fetch this entry.
    pub stale: bool,
}

/// Output of the wiki_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiEntriesOutput {
    pub total: u64,
    pub entries: Vec<EntryItem>,
}

/// Implementation of the wiki_entries tool.
pub async fn entries_impl(
    db: &CacheDb, policy: FreshnessPolicy, now: DateTime<Utc>, params: WikiEntriesParams,
) -> Result<CallToolResult, McpError> {
    let total = db.count_entries().await?;
    let entries = db
        .list_entries()
        .await?
        .into_iter()
        .take(params.limit.unwrap_or(usize::MAX))
        .map(|e| {
            let stale = policy.is_stale(e.created_at, now);
            EntryItem { id: e.id, title: e.title, created_at: e.created_at, modified_at: e.modified_at, stale }
        })
        .collect();

    json_result(&WikiEntriesOutput { total, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_lists_with_staleness() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        db.store_fetched("Old", "o", t0).await.unwrap();
        db.store_fetched("New", "n", t0 + Duration::days(6)).await.unwrap();

        let now = t0 + Duration::days(8);
        let out: WikiEntriesOutput =
            output(&entries_impl(&db, FreshnessPolicy::default(), now, WikiEntriesParams::default()).await.unwrap());
        assert_eq!(out.total, 2);
        assert_eq!(out.entries[0].title, "New");
        assert!(!out.entries[0].stale);
        assert!(out.entries[1].stale);

        let limited = WikiEntriesParams { limit: Some(1) };
        let out: WikiEntriesOutput = output(&entries_impl(&db, FreshnessPolicy::default(), now, limited).await.unwrap());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.total, 2);
    }
}
