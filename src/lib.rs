//! cptracker - competitive programming contest aggregator
//!
//! Collects upcoming contests from Codeforces, LeetCode, CodeChef and AtCoder,
//! normalizes them into one record shape and serves them over HTTP behind a
//! short-lived cache. Per-user submission and solved-count lookups ride along.
//!
//! # Architecture
//!
//! - [`crawler`] - One [`crawler::ContestSource`] per platform plus the shared HTTP fetcher
//! - [`parser`] - HTML parsers for scraped pages, decoupled from the network
//! - [`aggregator`] - Concurrent fan-out over sources, filtering and sorting
//! - [`cache`] / [`service`] - Freshness cache in front of the aggregator
//! - [`stats`] - Per-user submissions and solved counts
//! - [`server`] - axum HTTP API
//! - [`config`], [`metrics`], [`error`], [`models`], [`utils`]
//!
//! # Example
//!
//! ```no_run
//! use cptracker::config::Config;
//! use cptracker::server::{shutdown_signal, ApiServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = ApiServer::new(config)?;
//!     server.start_with_shutdown(shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod server;
pub mod service;
pub mod stats;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregator::{Aggregator, ContestAggregator};
    pub use crate::cache::ContestCache;
    pub use crate::config::{CacheScope, Config};
    pub use crate::crawler::{default_sources, ContestSource, HttpFetcher};
    pub use crate::error::{CptrackerErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{ContestRecord, Platform, UpcomingContests};
    pub use crate::service::ContestService;
    pub use crate::stats::StatsClient;
}

// Direct re-exports for convenience
pub use models::{ContestRecord, Platform};
