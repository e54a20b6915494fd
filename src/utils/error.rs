//! Error types for the cptracker crawler
//!
//! This module defines the error types raised at the fetch, parse and
//! per-source seams of the aggregation pipeline.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded (last status: {last_status:?})")]
    MaxRetriesExceeded { last_status: Option<u16> },

    /// Body could not be decoded into the expected shape
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether retrying the same request later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::MaxRetriesExceeded { .. } => true,
            Self::ServerError(status) => matches!(status, 429 | 500..=599),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while normalizing upstream data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Compact date-time such as `20240101T1200` could not be read
    #[error("Invalid compact date-time: {0}")]
    InvalidCompactDateTime(String),

    /// ISO-8601 date-time could not be read
    #[error("Invalid ISO date-time: {0}")]
    InvalidIsoDateTime(String),

    /// Duration cell not in `H:MM` / `HH:MM` form
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Expected query parameter missing from a link
    #[error("Missing query parameter `{param}` in {href}")]
    MissingQueryParam { param: String, href: String },

    /// Required field absent or null in an upstream row
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// Errors raised by a single contest source
///
/// Never escapes the aggregator: every variant is logged and turned into an
/// empty contest list for the failing platform.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Upstream reported a failure inside a successful HTTP response
    #[error("Upstream reported failure: {0}")]
    Upstream(String),
}

/// Errors raised by the per-user submission and stats lookups
#[derive(Error, Debug)]
pub enum StatsError {
    /// The upstream does not know this user
    #[error("Invalid username: {0}")]
    InvalidUser(String),

    /// No per-user data source exists for this platform
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}
