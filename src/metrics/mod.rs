//! Prometheus metrics for cptracker
//!
//! This module tracks:
//! - Sources: fetch outcome and duration per platform
//! - Cache: hits and misses of the contest cache
//! - API: requests per endpoint and status
//!
//! # Usage
//!
//! Call `init_metrics()` at startup. If registration fails, every recording
//! function below becomes a no-op.

use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

struct SourceMetrics {
    fetches: CounterVec,
    fetch_duration: HistogramVec,
    contests: CounterVec,
}

struct ServiceMetrics {
    cache_hits: Counter,
    cache_misses: Counter,
    api_requests: CounterVec,
}

static SOURCE_METRICS: OnceLock<SourceMetrics> = OnceLock::new();

static SERVICE_METRICS: OnceLock<ServiceMetrics> = OnceLock::new();

static METRICS_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// How a single source fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Success,
    Failure,
    Timeout,
    Panic,
}

impl SourceOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
            Self::Panic => "panic",
        }
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Register all metrics with the default Prometheus registry
///
/// Safe to call more than once and from several threads; only the first
/// call registers and later calls report its result.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    METRICS_INIT
        .get_or_init(|| register_metrics().map_err(|e| e.to_string()))
        .clone()
        .map_err(Into::into)
}

fn register_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let sources = SourceMetrics {
        fetches: register_counter_vec!(
            "cptracker_source_fetches_total",
            "Contest source fetches by platform and outcome",
            &["platform", "outcome"]
        )?,
        fetch_duration: register_histogram_vec!(
            "cptracker_source_fetch_duration_seconds",
            "Contest source fetch duration in seconds",
            &["platform"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]
        )?,
        contests: register_counter_vec!(
            "cptracker_source_contests_total",
            "Contest records produced by platform",
            &["platform"]
        )?,
    };

    let service = ServiceMetrics {
        cache_hits: register_counter!(
            "cptracker_cache_hits_total",
            "Upcoming-contest requests served from cache"
        )?,
        cache_misses: register_counter!(
            "cptracker_cache_misses_total",
            "Upcoming-contest requests that triggered an aggregation"
        )?,
        api_requests: register_counter_vec!(
            "cptracker_api_requests_total",
            "API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
    };

    SOURCE_METRICS
        .set(sources)
        .map_err(|_| "Source metrics already initialized")?;
    SERVICE_METRICS
        .set(service)
        .map_err(|_| "Service metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record how one source fetch ended
pub fn record_source_fetch(platform: &str, outcome: SourceOutcome, duration_secs: f64, contests: usize) {
    let Some(m) = SOURCE_METRICS.get() else {
        return;
    };

    m.fetches
        .with_label_values(&[platform, outcome.as_str()])
        .inc();
    m.fetch_duration
        .with_label_values(&[platform])
        .observe(duration_secs);

    if contests > 0 {
        m.contests
            .with_label_values(&[platform])
            .inc_by(contests as f64);
    }
}

/// Record a contest cache lookup
pub fn record_cache_lookup(hit: bool) {
    let Some(m) = SERVICE_METRICS.get() else {
        return;
    };

    if hit {
        m.cache_hits.inc();
    } else {
        m.cache_misses.inc();
    }
}

/// Record an API request
pub fn record_api_request(endpoint: &str, status: u16) {
    if let Some(m) = SERVICE_METRICS.get() {
        m.api_requests
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
        assert!(SOURCE_METRICS.get().is_some() && SERVICE_METRICS.get().is_some());
    }

    #[test]
    fn test_recorded_metrics_are_encoded() {
        init_metrics().ok();
        record_source_fetch("Codeforces", SourceOutcome::Success, 0.2, 3);
        record_cache_lookup(true);
        record_api_request("/health", 200);

        let text = encode_metrics().unwrap();
        assert!(text.contains("cptracker_source_fetches_total"));
        assert!(text.contains("cptracker_cache_hits_total"));
        assert!(text.contains("cptracker_api_requests_total"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(SourceOutcome::Timeout.as_str(), "timeout");
        assert_eq!(SourceOutcome::Panic.as_str(), "panic");
    }
}
