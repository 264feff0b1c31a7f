//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted staleness window, roughly a century.
pub const MAX_STALE_AFTER_DAYS: i64 = 36_500;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `wikipedia_base_url` is not an http(s) URL
    /// - `stale_after_days` is outside 1..=36500
    /// - `related_concurrency` is outside 1..=64
    /// - `http_addr` is set but not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.wikipedia_base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                return Err(ConfigError::Invalid {
                    field: "wikipedia_base_url".into(),
                    reason: format!("unsupported scheme: {}", u.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "wikipedia_base_url".into(), reason: e.to_string() });
            }
        }

        if self.stale_after_days < 1 {
            return Err(ConfigError::Invalid { field: "stale_after_days".into(), reason: "must be at least 1".into() });
        }
        if self.stale_after_days > MAX_STALE_AFTER_DAYS {
            return Err(ConfigError::Invalid {
                field: "stale_after_days".into(),
                reason: format!("must not exceed {MAX_STALE_AFTER_DAYS}"),
            });
        }

        if self.related_concurrency == 0 || self.related_concurrency > 64 {
            return Err(ConfigError::Invalid {
                field: "related_concurrency".into(),
                reason: "must be between 1 and 64".into(),
            });
        }

        self.http_socket_addr()?;

        if self.serve_stale_on_error {
            tracing::info!("serve_stale_on_error enabled; failed refreshes fall back to cached copies");
        }

        Ok(())
    }
}
