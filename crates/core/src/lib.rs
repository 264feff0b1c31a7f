//! Core types and shared functionality for wikicache.
//!
//! This crate provides:
//! - SQLite-backed article store with an append-only audit log
//! - Freshness policy and the fetch-or-serve decision engine
//! - "See also" expansion over any [`ArticleSource`]
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod freshness;
pub mod wiki;

pub use cache::{ActionType, CacheDb, LogQuery, LogSummary, WikiEntry, WikiEntryLog};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use freshness::{Clock, FreshnessPolicy, SystemClock};
pub use wiki::{ArticleSource, CacheStatus, Expansion, FetchError, RelatedResolution, Resolution, WikiCache};
