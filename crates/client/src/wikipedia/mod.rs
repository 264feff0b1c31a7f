//! Wikipedia Action API client.
//!
//! Fetches the plain-text extract of one article per request.
//!
//! ### Request
//!
//! - **Endpoint**: `https://en.wikipedia.org/w/api.php` (configurable)
//! - **Parameters**: `action=query`, `format=json`, `titles=<title>`,
//!   `prop=extracts`, `explaintext=1`, `formatversion=2`
//! - No retries or backoff; the configured timeout bounds each request.
//!
//! ### Error mapping
//!
//! - non-2xx status → [`FetchError::Transport`] with the status
//! - connect failure or timeout → [`FetchError::Transport`] without a status
//! - unexpected body shape, missing or empty extract → [`FetchError::Parse`]
//! - page flagged `missing` or `invalid` → [`FetchError::NotFound`]

pub mod response;

pub use response::QueryResponse;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use wikicache_core::{AppConfig, ArticleSource, FetchError};

/// Wikipedia client configuration.
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// Full API endpoint URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User-agent string; Wikimedia rejects requests without one.
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for WikipediaConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.wikipedia_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for the Wikipedia Action API.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: WikipediaConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport { status: None, reason: e.to_string() })?;

        Ok(Self { http, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(WikipediaConfig::from(config))
    }

    pub fn config(&self) -> &WikipediaConfig {
        &self.config
    }

    /// Fetch the plain-text extract for `title`.
    pub async fn fetch(&self, title: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("titles", title),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("formatversion", "2"),
        ];

        tracing::debug!("fetching Wikipedia article: title={}", title);

        let http_response = self
            .http
            .get(&self.config.base_url)
            .header(header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(transport)?;

        let status = http_response.status();
        tracing::debug!("Wikipedia API response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Transport {
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            });
        }

        let bytes = http_response.bytes().await.map_err(transport)?;
        let body: QueryResponse = serde_json::from_slice(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        let extract = body.into_extract(title)?;

        tracing::debug!("fetched '{}' in {:?}, {} bytes", title, start.elapsed(), extract.len());
        Ok(extract)
    }
}

fn transport(e: reqwest::Error) -> FetchError {
    let reason = if e.is_timeout() { "request timed out".to_string() } else { e.to_string() };
    FetchError::Transport { status: e.status().map(|s| s.as_u16()), reason }
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn fetch_article(&self, title: &str) -> Result<String, FetchError> {
        self.fetch(title).await
    }
}
