//! Read-only REST layer over the store.
//!
//! - `GET /wiki-entries`: entry summaries, most recently modified first
//! - `GET /wiki-entries/{id}`: one entry, content rendered as Markdown
//! - `GET /wiki-logs?title=&action_type=&limit=`: audit rows, newest first
//!
//! Nothing here fetches from upstream or writes to the store.

use std::str::FromStr;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wikicache_client::to_markdown;
use wikicache_core::{ActionType, CacheDb, Error, LogQuery, WikiEntry, WikiEntryLog};

use crate::error::ApiResult;

/// Row of the entry listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: i64,
    pub title: String,
    pub modified_at: DateTime<Utc>,
}

/// Single entry with Markdown content.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<WikiEntry> for EntryDetail {
    fn from(entry: WikiEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            content: to_markdown(&entry.content),
            created_at: entry.created_at,
            modified_at: entry.modified_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogParams {
    pub title: Option<String>,
    pub action_type: Option<String>,
    pub limit: Option<usize>,
}

impl LogParams {
    fn into_query(self) -> Result<LogQuery, Error> {
        let action_type = match self.action_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ActionType::from_str(raw)?),
        };
        let title = self.title.filter(|t| !t.trim().is_empty());
        Ok(LogQuery { title, action_type, limit: self.limit })
    }
}

pub fn router(db: CacheDb) -> Router {
    Router::new()
        .route("/wiki-entries", get(list_entries))
        .route("/wiki-entries/{id}", get(get_entry))
        .route("/wiki-logs", get(list_logs))
        .with_state(db)
}

async fn list_entries(State(db): State<CacheDb>) -> ApiResult<Json<Vec<EntrySummary>>> {
    let entries = db.list_entries().await?;
    let summaries = entries
        .into_iter()
        .map(|e| EntrySummary { id: e.id, title: e.title, modified_at: e.modified_at })
        .collect();
    Ok(Json(summaries))
}

async fn get_entry(State(db): State<CacheDb>, id: Result<Path<i64>, PathRejection>) -> ApiResult<Json<EntryDetail>> {
    let Path(id) = id?;
    let entry = db.get_entry(id).await?.ok_or(Error::EntryNotFound(id))?;
    Ok(Json(EntryDetail::from(entry)))
}

/// Malformed query strings map to `INVALID_INPUT`.
async fn list_logs(
    State(db): State<CacheDb>, params: Result<Query<LogParams>, QueryRejection>,
) -> ApiResult<Json<Vec<WikiEntryLog>>> {
    let Query(params) = params?;
    let query = params.into_query()?;
    Ok(Json(db.query_logs(&query).await?))
}
