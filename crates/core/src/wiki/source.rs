//! The upstream fetch capability.

use std::sync::Arc;

use async_trait::async_trait;

/// Why an article could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The page does not exist upstream.
    #[error("Wikipedia article '{0}' not found")]
    NotFound(String),

    /// Non-2xx response, network failure, or timeout.
    #[error("Wikipedia API request failed{}: {reason}", status_suffix(.status))]
    Transport { status: Option<u16>, reason: String },

    /// The response did not have the expected shape.
    #[error("Failed to parse Wikipedia API response: {0}")]
    Parse(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Something that can return the raw text of an article by title.
///
/// Implementations enforce their own timeouts and report them as
/// [`FetchError::Transport`]. No retries happen above this trait.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_article(&self, title: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<S: ArticleSource + ?Sized> ArticleSource for Arc<S> {
    async fn fetch_article(&self, title: &str) -> Result<String, FetchError> {
        (**self).fetch_article(title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let with_status = FetchError::Transport { status: Some(503), reason: "service unavailable".into() };
        assert_eq!(
            with_status.to_string(),
            "Wikipedia API request failed with status 503: service unavailable"
        );

        let without_status = FetchError::Transport { status: None, reason: "timed out".into() };
        assert_eq!(without_status.to_string(), "Wikipedia API request failed: timed out");
    }

    #[test]
    fn test_not_found_display() {
        let err = FetchError::NotFound("Nowhere".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Wikipedia article 'Nowhere' not found");
    }
}
