//! Client code for wikicache.
//!
//! This crate provides the Wikipedia Action API client used as the upstream
//! [`ArticleSource`](wikicache_core::ArticleSource), and the wiki-markup to
//! Markdown converter shared by the server and CLI.

pub mod markup;
pub mod wikipedia;

pub use markup::to_markdown;
pub use wikipedia::{WikipediaClient, WikipediaConfig};
