//! Article entry storage.
//!
//! Reads are plain queries. Writes always go through [`CacheDb::store_fetched`],
//! which upserts the entry and appends its audit row in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::logs::{ActionType, LogRecord, WikiEntryLog, insert_log};
use super::{format_timestamp, timestamp_column};
use crate::Error;

/// A cached Wikipedia article.
///
/// `content` is the raw text as fetched; it is converted to Markdown only on
/// the way out. `created_at` is the time of the last successful fetch and is
/// the anchor for freshness, while `modified_at` tracks every store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WikiEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Result of persisting freshly fetched content.
#[derive(Debug, Clone)]
pub struct StoredArticle {
    pub entry: WikiEntry,
    pub log: WikiEntryLog,
}

impl StoredArticle {
    /// Whether the write created a new entry or overwrote an existing one.
    pub fn action(&self) -> ActionType {
        self.log.action_type
    }
}

const ENTRY_COLUMNS: &str = "id, title, content, created_at, modified_at";

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WikiEntry> {
    Ok(WikiEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        modified_at: timestamp_column(row, 4)?,
    })
}

pub(crate) fn select_entry_by_title(conn: &rusqlite::Connection, title: &str) -> Result<Option<WikiEntry>, Error> {
    let mut stmt = conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM wiki_entries WHERE title = ?1"))?;
    match stmt.query_row(params![title], entry_from_row) {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn insert_entry(
    conn: &rusqlite::Connection, title: &str, content: &str, at: &DateTime<Utc>,
) -> Result<WikiEntry, Error> {
    let stamp = format_timestamp(at);
    conn.execute(
        "INSERT INTO wiki_entries (title, content, created_at, modified_at) VALUES (?1, ?2, ?3, ?3)",
        params![title, content, stamp],
    )?;

    Ok(WikiEntry {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        content: content.to_string(),
        created_at: *at,
        modified_at: *at,
    })
}

pub(crate) fn update_entry(
    conn: &rusqlite::Connection, mut entry: WikiEntry, content: &str, at: &DateTime<Utc>,
) -> Result<WikiEntry, Error> {
    let stamp = format_timestamp(at);
    conn.execute(
        "UPDATE wiki_entries SET content = ?1, created_at = ?2, modified_at = ?2 WHERE id = ?3",
        params![content, stamp, entry.id],
    )?;

    entry.content = content.to_string();
    entry.created_at = *at;
    entry.modified_at = *at;
    Ok(entry)
}

impl CacheDb {
    /// Look up an entry by exact (case-sensitive) title.
    pub async fn find_entry_by_title(&self, title: &str) -> Result<Option<WikiEntry>, Error> {
        let title = title.to_string();
        self.conn
            .call(move |conn| select_entry_by_title(conn, &title))
            .await
            .map_err(Error::from)
    }

    /// Get an entry by id.
    pub async fn get_entry(&self, id: i64) -> Result<Option<WikiEntry>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<WikiEntry>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM wiki_entries WHERE id = ?1"))?;
                match stmt.query_row(params![id], entry_from_row) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// All entries, most recently modified first.
    pub async fn list_entries(&self) -> Result<Vec<WikiEntry>, Error> {
        self.select_entries("modified_at DESC, id DESC").await
    }

    /// All entries, most recently fetched first.
    pub async fn list_entries_by_fetch(&self) -> Result<Vec<WikiEntry>, Error> {
        self.select_entries("created_at DESC, id DESC").await
    }

    async fn select_entries(&self, order_by: &'static str) -> Result<Vec<WikiEntry>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<WikiEntry>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM wiki_entries ORDER BY {order_by}"))?;
                let rows = stmt.query_map([], entry_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored entries.
    pub async fn count_entries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM wiki_entries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Persist freshly fetched content for `title` and log the write.
    ///
    /// The title is looked up again inside the transaction: an existing row is
    /// overwritten in place (`update`), otherwise a new row is inserted
    /// (`create`). The entry write and its log row commit together or not at
    /// all, and the log row always carries the entry's id.
    pub async fn store_fetched(&self, title: &str, content: &str, at: DateTime<Utc>) -> Result<StoredArticle, Error> {
        if content.is_empty() {
            return Err(Error::InvalidInput(format!("refusing to store empty content for '{title}'")));
        }

        let title = title.to_string();
        let content = content.to_string();
        self.conn
            .call(move |conn| -> Result<StoredArticle, Error> {
                let tx = conn.transaction()?;

                let (entry, action) = match select_entry_by_title(&tx, &title)? {
                    Some(existing) => (update_entry(&tx, existing, &content, &at)?, ActionType::Update),
                    None => (insert_entry(&tx, &title, &content, &at)?, ActionType::Create),
                };
                let log = insert_log(&tx, &LogRecord::fetched(&entry, action), &at)?;

                tx.commit()?;
                Ok(StoredArticle { entry, log })
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_store_fetched_creates_then_updates() {
        let db = CacheDb::open_in_memory().await.unwrap();

        let created = db.store_fetched("Cat", "Cats are small.", at(1)).await.unwrap();
        assert_eq!(created.action(), ActionType::Create);
        assert_eq!(created.log.wiki_entry_id, Some(created.entry.id));

        let updated = db.store_fetched("Cat", "Cats are mammals.", at(9)).await.unwrap();
        assert_eq!(updated.action(), ActionType::Update);
        assert_eq!(updated.entry.id, created.entry.id);
        assert_eq!(updated.entry.content, "Cats are mammals.");
        assert_eq!(updated.entry.created_at, at(9));

        let stored = db.find_entry_by_title("Cat").await.unwrap().unwrap();
        assert_eq!(stored, updated.entry);
        assert_eq!(db.count_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_is_case_sensitive() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store_fetched("Cat", "text", at(1)).await.unwrap();

        assert!(db.find_entry_by_title("Cat").await.unwrap().is_some());
        assert!(db.find_entry_by_title("cat").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_entry_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_entry(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_fetched_rejects_empty_content() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.store_fetched("Cat", "", at(1)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(db.count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orderings() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store_fetched("Cat", "a", at(1)).await.unwrap();
        db.store_fetched("Dog", "b", at(2)).await.unwrap();
        db.store_fetched("Cat", "c", at(3)).await.unwrap();

        let by_modified: Vec<_> = db.list_entries().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(by_modified, ["Cat", "Dog"]);

        let by_fetch: Vec<_> = db.list_entries_by_fetch().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(by_fetch, ["Cat", "Dog"]);
    }

    #[tokio::test]
    async fn test_timestamps_round_trip_with_subsecond_precision() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let when = at(1) + Duration::microseconds(123_456);
        let stored = db.store_fetched("Cat", "a", when).await.unwrap();

        let entry = db.get_entry(stored.entry.id).await.unwrap().unwrap();
        assert_eq!(entry.created_at, when);
        assert_eq!(entry.modified_at, when);
    }
}
