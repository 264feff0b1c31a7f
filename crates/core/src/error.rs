//! Unified error types for wikicache.
//!
//! The code prefix in each message is stable so callers can render
//! "no such article" differently from upstream outages.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::wiki::FetchError;

/// Unified error type shared by the engine, the server, and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty title).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The article does not exist upstream.
    #[error("ARTICLE_NOT_FOUND: {0}")]
    ArticleNotFound(String),

    /// Non-2xx response, network failure, or timeout while fetching.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// The upstream response did not have the expected shape.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// No stored entry with the given id.
    #[error("ENTRY_NOT_FOUND: {0}")]
    EntryNotFound(i64),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Stable upper-case code, matching the message prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::ArticleNotFound(_) => "ARTICLE_NOT_FOUND",
            Error::FetchFailed(_) => "FETCH_FAILED",
            Error::ParseFailed(_) => "PARSE_FAILED",
            Error::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Error::Database(_) | Error::MigrationFailed(_) => "CACHE_ERROR",
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(title) => Error::ArticleNotFound(title),
            e @ FetchError::Transport { .. } => Error::FetchFailed(e.to_string()),
            FetchError::Parse(msg) => Error::ParseFailed(msg),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::ArticleNotFound(_) => -32001,
            Error::EntryNotFound(_) => -32003,
            Error::FetchFailed(_) => -32004,
            Error::ParseFailed(_) => -32005,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ArticleNotFound("Nonexistent".to_string());
        assert!(err.to_string().contains("ARTICLE_NOT_FOUND"));
        assert!(err.to_string().contains("Nonexistent"));
    }

    #[test]
    fn test_fetch_error_conversion_keeps_kind() {
        let not_found: Error = FetchError::NotFound("Cat".into()).into();
        assert!(matches!(not_found, Error::ArticleNotFound(ref t) if t == "Cat"));

        let transport: Error = FetchError::Transport { status: Some(503), reason: "unavailable".into() }.into();
        assert!(matches!(transport, Error::FetchFailed(ref m) if m.contains("503")));

        let parse: Error = FetchError::Parse("missing query.pages".into()).into();
        assert!(matches!(parse, Error::ParseFailed(_)));
    }

    #[test]
    fn test_code_matches_display_prefix() {
        for err in [
            Error::InvalidInput("x".into()),
            Error::ArticleNotFound("x".into()),
            Error::FetchFailed("x".into()),
            Error::ParseFailed("x".into()),
            Error::EntryNotFound(4),
            Error::MigrationFailed("x".into()),
        ] {
            assert!(err.to_string().starts_with(err.code()), "{err}");
        }
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::ArticleNotFound("Cat".to_string()).into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::FetchFailed("status 500".to_string()).into();
        assert_eq!(mcp_err.code.0, -32004);
    }
}
