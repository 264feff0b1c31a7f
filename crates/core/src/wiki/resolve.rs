//! Fetch-or-serve decisions.
//!
//! For each title the engine looks the entry up, applies the freshness
//! policy, and then either serves the stored text (logging `check`) or
//! fetches and persists new text (logging `create` or `update`). Entry
//! writes and their log rows share one transaction, so a failed fetch or a
//! failed write leaves nothing behind.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::related::{Expansion, expand};
use super::source::{ArticleSource, FetchError};
use crate::Error;
use crate::cache::{ActionType, CacheDb, LogRecord, WikiEntry};
use crate::config::AppConfig;
use crate::freshness::{Clock, FreshnessPolicy, SystemClock};

/// How a resolved article was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    /// Fresh entry served without a fetch.
    CacheHit,
    /// Stale entry re-fetched and overwritten.
    Updated,
    /// Unseen title fetched and stored.
    Created,
    /// Refresh failed upstream; the stale copy was served instead.
    Stale,
}

impl CacheStatus {
    /// Human-readable status line shown to callers.
    pub fn message(&self) -> &'static str {
        match self {
            CacheStatus::CacheHit => "Retrieved from database cache.",
            CacheStatus::Updated => "Article successfully updated in database.",
            CacheStatus::Created => "Article successfully stored in database.",
            CacheStatus::Stale => "Refresh failed; serving stale cached copy.",
        }
    }

    fn from_action(action: ActionType) -> Self {
        match action {
            ActionType::Create => CacheStatus::Created,
            ActionType::Update => CacheStatus::Updated,
            ActionType::Check => CacheStatus::CacheHit,
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Article text returned by [`WikiCache::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub entry_id: i64,
    pub title: String,
    pub content: String,
    pub status: CacheStatus,
}

impl Resolution {
    fn from_entry(entry: WikiEntry, status: CacheStatus) -> Self {
        Self { entry_id: entry.id, title: entry.title, content: entry.content, status }
    }

    pub fn message(&self) -> &'static str {
        self.status.message()
    }
}

/// Main and related articles after each went through the cache.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelatedResolution {
    pub main: Resolution,
    pub related: Vec<Resolution>,
}

/// What happened to one entry during [`WikiCache::refresh_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum RefreshStatus {
    Updated,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RefreshOutcome {
    pub title: String,
    pub status: RefreshStatus,
}

/// Result of a bulk refresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RefreshSummary {
    pub outcomes: Vec<RefreshOutcome>,
}

impl RefreshSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, RefreshStatus::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RefreshStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RefreshStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RefreshStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// The cache decision engine.
///
/// Holds the store, the upstream source, and the clock used for every
/// freshness check and timestamp. One instance serves one operator; calls
/// for the same title are not serialized against each other.
pub struct WikiCache<S, C = SystemClock> {
    db: CacheDb,
    source: S,
    clock: C,
    policy: FreshnessPolicy,
    serve_stale_on_error: bool,
    related_concurrency: usize,
}

impl<S: ArticleSource> WikiCache<S, SystemClock> {
    pub fn new(db: CacheDb, source: S, config: &AppConfig) -> Self {
        Self {
            db,
            source,
            clock: SystemClock,
            policy: config.freshness(),
            serve_stale_on_error: config.serve_stale_on_error,
            related_concurrency: config.related_concurrency,
        }
    }
}

impl<S: ArticleSource, C: Clock> WikiCache<S, C> {
    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> WikiCache<S, C2> {
        WikiCache {
            db: self.db,
            source: self.source,
            clock,
            policy: self.policy,
            serve_stale_on_error: self.serve_stale_on_error,
            related_concurrency: self.related_concurrency,
        }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Return the article for `title`, fetching it when absent or stale.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank title
    /// - `ArticleNotFound`, `FetchFailed`, `ParseFailed` when a needed fetch fails
    ///   (nothing is written in that case)
    /// - `Database` when the store fails
    pub async fn resolve(&self, title: &str) -> Result<Resolution, Error> {
        let title = normalize_title(title)?;
        let now = self.clock.now();

        let existing = self.db.find_entry_by_title(title).await?;
        match existing {
            Some(entry) if !self.policy.is_stale(entry.created_at, now) => self.serve_cached(entry, now).await,
            existing => self.fetch_and_store(title, existing).await,
        }
    }

    async fn fetch_and_store(&self, title: &str, existing: Option<WikiEntry>) -> Result<Resolution, Error> {
        tracing::debug!(title, cached = existing.is_some(), "fetching article");
        match self.source.fetch_article(title).await {
            Ok(content) => self.persist(title, &content).await,
            Err(err) => self.fetch_failed(title, existing, err).await,
        }
    }

    /// Same decision as [`resolve`](Self::resolve), using `content` that was
    /// already fetched instead of fetching again.
    pub async fn resolve_prefetched(&self, title: &str, content: &str) -> Result<Resolution, Error> {
        let title = normalize_title(title)?;
        let now = self.clock.now();

        match self.db.find_entry_by_title(title).await? {
            Some(entry) if !self.policy.is_stale(entry.created_at, now) => self.serve_cached(entry, now).await,
            _ => self.persist(title, content).await,
        }
    }

    /// Fetch an article and its "See also" articles without touching the store.
    pub async fn expand(&self, title: &str) -> Result<Expansion, Error> {
        let title = normalize_title(title)?;
        expand(&self.source, title, self.related_concurrency)
            .await
            .map_err(Error::from)
    }

    /// Expand `title`, then run the main and every related article through the cache.
    pub async fn resolve_related(&self, title: &str) -> Result<RelatedResolution, Error> {
        let title = normalize_title(title)?;
        let expansion = self.expand(title).await?;

        let main = self.resolve_prefetched(title, &expansion.main_article).await?;
        let mut related = Vec::with_capacity(expansion.related_articles.len());
        for article in &expansion.related_articles {
            related.push(self.resolve_prefetched(&article.title, &article.content).await?);
        }

        Ok(RelatedResolution { main, related })
    }

    /// Re-fetch stored entries: stale ones, or all of them with `force`.
    ///
    /// A failure on one entry is recorded in the summary and does not stop the run.
    pub async fn refresh_all(&self, force: bool) -> Result<RefreshSummary, Error> {
        let entries = self.db.list_entries_by_fetch().await?;
        let mut summary = RefreshSummary::default();

        for entry in entries {
            let status = if !force && !self.policy.is_stale(entry.created_at, self.clock.now()) {
                RefreshStatus::Skipped
            } else {
                match self.refetch(&entry.title).await {
                    Ok(()) => RefreshStatus::Updated,
                    Err(err) => {
                        tracing::warn!(title = %entry.title, error = %err, "refresh failed");
                        RefreshStatus::Failed(err.to_string())
                    }
                }
            };
            summary.outcomes.push(RefreshOutcome { title: entry.title, status });
        }

        tracing::info!(
            total = summary.total(),
            updated = summary.updated(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "refresh finished"
        );
        Ok(summary)
    }

    async fn refetch(&self, title: &str) -> Result<(), Error> {
        let content = self.source.fetch_article(title).await?;
        self.persist(title, &content).await.map(|_| ())
    }

    async fn serve_cached(&self, entry: WikiEntry, now: DateTime<Utc>) -> Result<Resolution, Error> {
        self.db.record_check(LogRecord::cache_hit(&entry), now).await?;
        tracing::debug!(title = %entry.title, id = entry.id, "cache hit");
        Ok(Resolution::from_entry(entry, CacheStatus::CacheHit))
    }

    async fn persist(&self, title: &str, content: &str) -> Result<Resolution, Error> {
        let stored = self.db.store_fetched(title, content, self.clock.now()).await?;
        let status = CacheStatus::from_action(stored.action());
        tracing::info!(title, id = stored.entry.id, action = %stored.action(), "article stored");
        Ok(Resolution::from_entry(stored.entry, status))
    }

    async fn fetch_failed(
        &self, title: &str, existing: Option<WikiEntry>, err: FetchError,
    ) -> Result<Resolution, Error> {
        match existing {
            Some(entry) if self.serve_stale_on_error && !err.is_not_found() => {
                tracing::warn!(title, error = %err, "refresh failed; serving stale copy");
                self.db
                    .record_check(LogRecord::stale_fallback(&entry), self.clock.now())
                    .await?;
                Ok(Resolution::from_entry(entry, CacheStatus::Stale))
            }
            _ => Err(err.into()),
        }
    }
}

fn normalize_title(title: &str) -> Result<&str, Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("title cannot be empty".into()));
    }
    Ok(title)
}
