//! Wikipedia Action API response types (`formatversion=2`).

use serde::Deserialize;
use wikicache_core::FetchError;

/// Raw body of an `action=query&prop=extracts` request.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub query: Option<QueryBody>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// One page entry. Missing and invalid titles come back as flagged pages
/// rather than as HTTP errors.
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub invalidreason: Option<String>,
    #[serde(default)]
    pub extract: Option<String>,
}

/// Top-level API error object.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl QueryResponse {
    /// Pull the plain-text extract of the first page.
    pub fn into_extract(self, title: &str) -> Result<String, FetchError> {
        if let Some(err) = self.error {
            return Err(FetchError::Parse(format!("API error {}: {}", err.code, err.info)));
        }

        let page = self
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| FetchError::Parse("response has no query.pages[0]".into()))?;

        if page.missing || page.invalid {
            tracing::debug!(title, page_title = ?page.title, reason = ?page.invalidreason, "no such page");
            return Err(FetchError::NotFound(title.to_string()));
        }

        match page.extract {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(FetchError::Parse(format!("empty extract for '{title}'"))),
            None => Err(FetchError::Parse("page has no extract field".into())),
        }
    }
}
