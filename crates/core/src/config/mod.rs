//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, in order of precedence:
//!
//! 1. Environment variables (WIKICACHE_*)
//! 2. TOML config file (if WIKICACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The resulting [`AppConfig`] is handed to each component at construction;
//! nothing reads settings from ambient state afterwards.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::freshness::FreshnessPolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via WIKICACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Wikipedia Action API endpoint.
    ///
    /// Set via WIKICACHE_WIKIPEDIA_BASE_URL environment variable.
    #[serde(default = "default_wikipedia_base_url")]
    pub wikipedia_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via WIKICACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WIKICACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Age in days after which a stored entry is re-fetched.
    ///
    /// Set via WIKICACHE_STALE_AFTER_DAYS environment variable.
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// Maximum number of related articles fetched at once.
    ///
    /// Set via WIKICACHE_RELATED_CONCURRENCY environment variable.
    #[serde(default = "default_related_concurrency")]
    pub related_concurrency: usize,

    /// Serve the stale copy when refreshing an existing entry fails upstream.
    ///
    /// Set via WIKICACHE_SERVE_STALE_ON_ERROR environment variable.
    #[serde(default)]
    pub serve_stale_on_error: bool,

    /// Listen address for the REST layer; REST is disabled when unset.
    ///
    /// Set via WIKICACHE_HTTP_ADDR environment variable.
    #[serde(default)]
    pub http_addr: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wikicache.sqlite")
}

fn default_wikipedia_base_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}

fn default_user_agent() -> String {
    "wikicache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_stale_after_days() -> i64 {
    7
}

fn default_related_concurrency() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            wikipedia_base_url: default_wikipedia_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            stale_after_days: default_stale_after_days(),
            related_concurrency: default_related_concurrency(),
            serve_stale_on_error: false,
            http_addr: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Freshness policy derived from `stale_after_days`.
    pub fn freshness(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_days(self.stale_after_days)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WIKICACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WIKICACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Socket address for the REST layer, if enabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `http_addr` is set but unparsable.
    pub fn http_socket_addr(&self) -> Result<Option<std::net::SocketAddr>, ConfigError> {
        self.http_addr
            .as_deref()
            .map(|addr| {
                addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    field: "http_addr".into(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./wikicache.sqlite"));
        assert_eq!(config.wikipedia_base_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.user_agent, "wikicache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.stale_after_days, 7);
        assert_eq!(config.related_concurrency, 8);
        assert!(!config.serve_stale_on_error);
        assert!(config.http_addr.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_freshness_from_config() {
        let config = AppConfig { stale_after_days: 3, ..Default::default() };
        assert_eq!(config.freshness().max_age(), chrono::Duration::days(3));
    }

    #[test]
    fn test_http_socket_addr() {
        let config = AppConfig::default();
        assert!(config.http_socket_addr().unwrap().is_none());

        let config = AppConfig { http_addr: Some("127.0.0.1:8080".into()), ..Default::default() };
        assert_eq!(config.http_socket_addr().unwrap().unwrap().port(), 8080);

        let config = AppConfig { http_addr: Some("not an address".into()), ..Default::default() };
        assert!(matches!(config.http_socket_addr(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("wikicache.toml", "timeout_ms = 5000\nstale_after_days = 14\n")?;
            jail.set_env("WIKICACHE_CONFIG_FILE", "wikicache.toml");
            jail.set_env("WIKICACHE_STALE_AFTER_DAYS", "2");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.stale_after_days, 2);
            assert_eq!(config.user_agent, "wikicache/0.1");
            Ok(())
        });
    }
}
