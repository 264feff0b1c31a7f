//! SQLite-backed store for cached articles and the cache-decision audit log.
//!
//! This module provides a persistent store using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - One row per distinct article title (`wiki_entries`)
//! - An append-only audit log of cache decisions (`wiki_entry_logs`)
//! - Entry mutation and its log row committed in a single transaction
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod logs;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{StoredArticle, WikiEntry};
pub use logs::{ActionType, LogQuery, LogRecord, LogSummary, WikiEntryLog};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::rusqlite;

/// Format a timestamp as fixed-width RFC 3339 so lexical order is chronological.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read a stored RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}
