//! Append-only audit log of cache decisions.
//!
//! Every decision made by the engine writes exactly one row. Rows are never
//! updated or deleted by normal operation; `wiki_entry_id` is a weak
//! reference used only for joins and filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::entries::WikiEntry;
use super::{format_timestamp, timestamp_column};
use crate::Error;

/// Default number of rows returned by [`CacheDb::query_logs`].
pub const DEFAULT_LOG_LIMIT: usize = 20;

/// Kind of cache decision recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Served from cache without a fetch.
    Check,
    /// Stale entry re-fetched and overwritten.
    Update,
    /// New entry fetched and inserted.
    Create,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Check => "check",
            ActionType::Update => "update",
            ActionType::Create => "create",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "check" => Ok(ActionType::Check),
            "update" => Ok(ActionType::Update),
            "create" => Ok(ActionType::Create),
            other => Err(Error::InvalidInput(format!(
                "unknown action type '{other}' (expected check, update, or create)"
            ))),
        }
    }
}

/// A stored audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WikiEntryLog {
    pub id: i64,
    pub wiki_entry_id: Option<i64>,
    pub title: String,
    pub action_type: ActionType,
    pub action_time: DateTime<Utc>,
    pub cache_hit: bool,
    pub needed_update: bool,
    pub was_updated: bool,
}

/// An audit row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub wiki_entry_id: Option<i64>,
    pub title: String,
    pub action_type: ActionType,
    pub cache_hit: bool,
    pub needed_update: bool,
    pub was_updated: bool,
}

impl LogRecord {
    /// Fresh entry served from the store.
    pub fn cache_hit(entry: &WikiEntry) -> Self {
        Self {
            wiki_entry_id: Some(entry.id),
            title: entry.title.clone(),
            action_type: ActionType::Check,
            cache_hit: true,
            needed_update: false,
            was_updated: false,
        }
    }

    /// Stale entry served because its refresh failed upstream.
    pub fn stale_fallback(entry: &WikiEntry) -> Self {
        Self { needed_update: true, ..Self::cache_hit(entry) }
    }

    /// Entry written after a successful fetch.
    pub fn fetched(entry: &WikiEntry, action: ActionType) -> Self {
        Self {
            wiki_entry_id: Some(entry.id),
            title: entry.title.clone(),
            action_type: action,
            cache_hit: false,
            needed_update: true,
            was_updated: true,
        }
    }
}

/// Filters for reading the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LogQuery {
    /// Exact title to match.
    #[serde(default)]
    pub title: Option<String>,
    /// Only rows of this action type.
    #[serde(default)]
    pub action_type: Option<ActionType>,
    /// Maximum number of rows (default: 20).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Aggregate counts over a set of audit rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogSummary {
    pub total: usize,
    pub cache_hits: usize,
    pub updates: usize,
}

impl LogSummary {
    pub fn from_logs(logs: &[WikiEntryLog]) -> Self {
        Self {
            total: logs.len(),
            cache_hits: logs.iter().filter(|l| l.cache_hit).count(),
            updates: logs.iter().filter(|l| l.was_updated).count(),
        }
    }

    pub fn cache_hit_pct(&self) -> f64 {
        percentage(self.cache_hits, self.total)
    }

    pub fn update_pct(&self) -> f64 {
        percentage(self.updates, self.total)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { part as f64 / total as f64 * 100.0 }
}

const LOG_COLUMNS: &str = "id, wiki_entry_id, title, action_type, action_time, cache_hit, needed_update, was_updated";

fn log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WikiEntryLog> {
    let action: String = row.get(3)?;
    let action_type = action.parse::<ActionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.to_string().into())
    })?;

    Ok(WikiEntryLog {
        id: row.get(0)?,
        wiki_entry_id: row.get(1)?,
        title: row.get(2)?,
        action_type,
        action_time: timestamp_column(row, 4)?,
        cache_hit: row.get(5)?,
        needed_update: row.get(6)?,
        was_updated: row.get(7)?,
    })
}

pub(crate) fn insert_log(
    conn: &rusqlite::Connection, record: &LogRecord, at: &DateTime<Utc>,
) -> Result<WikiEntryLog, Error> {
    conn.execute(
        "INSERT INTO wiki_entry_logs (
            wiki_entry_id, title, action_type, action_time, cache_hit, needed_update, was_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.wiki_entry_id,
            &record.title,
            record.action_type.as_str(),
            format_timestamp(at),
            record.cache_hit,
            record.needed_update,
            record.was_updated,
        ],
    )?;

    Ok(WikiEntryLog {
        id: conn.last_insert_rowid(),
        wiki_entry_id: record.wiki_entry_id,
        title: record.title.clone(),
        action_type: record.action_type,
        action_time: *at,
        cache_hit: record.cache_hit,
        needed_update: record.needed_update,
        was_updated: record.was_updated,
    })
}

impl CacheDb {
    /// Append a decision that did not touch the entry (cache hit or stale fallback).
    pub async fn record_check(&self, record: LogRecord, at: DateTime<Utc>) -> Result<WikiEntryLog, Error> {
        self.conn
            .call(move |conn| -> Result<WikiEntryLog, Error> {
                let tx = conn.transaction()?;
                let log = insert_log(&tx, &record, &at)?;
                tx.commit()?;
                Ok(log)
            })
            .await
            .map_err(Error::from)
    }

    /// Read audit rows, newest first.
    pub async fn query_logs(&self, query: &LogQuery) -> Result<Vec<WikiEntryLog>, Error> {
        let title = query.title.clone();
        let action = query.action_type.map(|a| a.as_str());
        let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT) as i64;

        self.conn
            .call(move |conn| -> Result<Vec<WikiEntryLog>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {LOG_COLUMNS} FROM wiki_entry_logs
                     WHERE (?1 IS NULL OR title = ?1)
                       AND (?2 IS NULL OR action_type = ?2)
                     ORDER BY action_time DESC, id DESC
                     LIMIT ?3"
                ))?;
                let rows = stmt.query_map(params![title, action, limit], log_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }
}
