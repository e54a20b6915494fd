//! Configuration management for cptracker
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Default listening port when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Outbound fetch configuration
    pub fetcher: FetcherConfig,

    /// Contest cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: IpAddr,

    /// Bind port
    pub port: u16,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Trace every HTTP request
    pub enable_request_logging: bool,
}

/// Outbound fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Single request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retry attempts after the first request
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    pub retry_base_delay_ms: u64,

    /// Upper bound in seconds for one source's whole fetch, retries included
    pub source_timeout_secs: u64,

    /// Fixed user agent string (rotates through a browser pool when unset)
    pub user_agent: Option<String>,
}

/// Which platforms a cache-miss aggregation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// Always aggregate every known platform; filter per request
    #[default]
    AllPlatforms,
    /// Aggregate only the requested platforms and cache that result
    Requested,
}

/// Contest cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window in seconds
    pub ttl_secs: u64,

    /// Aggregation scope on cache miss
    pub scope: CacheScope,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
            source_timeout_secs: 20,
            user_agent: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600, // 10 minutes
            scope: CacheScope::AllPlatforms,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `PORT` sets the listening port; everything else uses `CPTRACKER_*`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {v:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let host = std::env::var("CPTRACKER_HOST")
            .ok()
            .and_then(|v| v.parse::<IpAddr>().ok())
            .unwrap_or(defaults.server.host);

        let enable_cors = env_parse("CPTRACKER_ENABLE_CORS").unwrap_or(defaults.server.enable_cors);

        let request_timeout_secs = env_parse("CPTRACKER_REQUEST_TIMEOUT")
            .unwrap_or(defaults.fetcher.request_timeout_secs);

        let max_retries = env_parse("CPTRACKER_MAX_RETRIES").unwrap_or(defaults.fetcher.max_retries);

        let source_timeout_secs = env_parse("CPTRACKER_SOURCE_TIMEOUT")
            .unwrap_or(defaults.fetcher.source_timeout_secs);

        let user_agent = std::env::var("CPTRACKER_USER_AGENT").ok();

        let ttl_secs = env_parse("CPTRACKER_CACHE_TTL").unwrap_or(defaults.cache.ttl_secs);

        let scope = match std::env::var("CPTRACKER_CACHE_SCOPE").as_deref() {
            Ok("requested") => CacheScope::Requested,
            Ok("all_platforms") | Err(_) => CacheScope::AllPlatforms,
            Ok(other) => anyhow::bail!("Unknown CPTRACKER_CACHE_SCOPE: {other}"),
        };

        let log_level =
            std::env::var("CPTRACKER_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("CPTRACKER_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                enable_cors,
                ..defaults.server
            },
            fetcher: FetcherConfig {
                request_timeout_secs,
                max_retries,
                source_timeout_secs,
                user_agent,
                ..defaults.fetcher
            },
            cache: CacheConfig { ttl_secs, scope },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        if self.fetcher.request_timeout_secs == 0 {
            anyhow::bail!("fetcher.request_timeout_secs must be greater than 0");
        }

        if self.fetcher.source_timeout_secs == 0 {
            anyhow::bail!("fetcher.source_timeout_secs must be greater than 0");
        }

        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be greater than 0");
        }

        Ok(())
    }

    /// Socket address the server binds to
    #[must_use]
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Get cache freshness window as Duration
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

impl FetcherConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get per-source timeout as Duration
    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.scope, CacheScope::AllPlatforms);
    }

    #[test]
    fn test_invalid_ttl() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.fetcher.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.fetcher.source_timeout(), Duration::from_secs(20));
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [cache]
            scope = "requested"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.server.enable_cors);
        assert_eq!(config.cache.scope, CacheScope::Requested);
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.fetcher.max_retries, 2);
    }
}
