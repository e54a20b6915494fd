//! Unified error handling for the cptracker crate
//!
//! Module seams keep their own error enums ([`FetchError`], [`ParseError`],
//! [`SourceError`], [`StatsError`]); this module wraps the ones that reach
//! the HTTP layer in one [`Error`] so handlers can classify them.
//!
//! # Architecture
//!
//! - [`CptrackerErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping the domain-specific errors
//!
//! Per-source failures never reach [`Error`] on the upcoming-contests path:
//! the aggregator swallows them. [`Error::Aggregation`] is what is left when
//! the aggregation plumbing itself breaks.

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{FetchError, ParseError, SourceError, StatsError};

/// Common trait for cptracker error types
pub trait CptrackerErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, upstream status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Caller named something the upstream does not know
    InvalidInput,
    /// Caller asked for a platform without a data source
    NotFound,
    /// Aggregation plumbing (task join) errors
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// Unified error type for the cptracker crate
#[derive(Error, Debug)]
pub enum Error {
    /// Per-user submission or stats lookup failed
    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),

    /// Aggregation could not complete
    #[error("Aggregation failed: {0}")]
    Aggregation(String),
}

impl CptrackerErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Stats(StatsError::Fetch(e)) => e.is_recoverable(),
            Self::Stats(_) => false,
            Self::Aggregation(_) => true,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Stats(StatsError::InvalidUser(_)) => ErrorCategory::InvalidInput,
            Self::Stats(StatsError::UnsupportedPlatform(_)) => ErrorCategory::NotFound,
            Self::Stats(StatsError::Parse(_)) => ErrorCategory::Parsing,
            Self::Stats(StatsError::Fetch(FetchError::Decode(_))) => ErrorCategory::Parsing,
            Self::Stats(StatsError::Fetch(_)) => ErrorCategory::Network,
            Self::Aggregation(_) => ErrorCategory::Internal,
        }
    }
}

impl Error {
    /// Create an aggregation error
    pub fn aggregation(msg: impl Into<String>) -> Self {
        Self::Aggregation(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let user_err = Error::from(StatsError::InvalidUser("nobody".into()));
        assert_eq!(user_err.category(), ErrorCategory::InvalidInput);

        let platform_err = Error::from(StatsError::UnsupportedPlatform("GeeksforGeeks".into()));
        assert_eq!(platform_err.category(), ErrorCategory::NotFound);

        let fetch_err = Error::from(StatsError::Fetch(FetchError::Timeout));
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let decode_err = Error::from(StatsError::Fetch(FetchError::Decode("eof".into())));
        assert_eq!(decode_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::from(StatsError::Fetch(FetchError::ServerError(503))).is_recoverable());
        assert!(!Error::from(StatsError::Fetch(FetchError::ServerError(404))).is_recoverable());
        assert!(!Error::from(StatsError::InvalidUser("ghost".into())).is_recoverable());
    }

    #[test]
    fn test_aggregation_error() {
        let err = Error::aggregation("task cancelled");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Aggregation failed: task cancelled");
    }
}
