//! Fan-out/fan-in contest aggregation
//!
//! Every selected source runs as its own task under a timeout. Whatever a
//! source does (error, timeout, panic) only costs that platform its
//! contests. The merged list is then filtered to time-boxed contests and
//! sorted by start time.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::crawler::ContestSource;
use crate::error::{Error, Result};
use crate::metrics::{self, SourceOutcome};
use crate::models::{ContestRecord, Platform};

/// Produces the merged, filtered and sorted contest list for some platforms
#[async_trait]
pub trait ContestAggregator: Send + Sync {
    /// Aggregate contests for the platform names in `requested`
    async fn aggregate(&self, requested: &[String]) -> Result<Vec<ContestRecord>>;
}

/// Runs contest sources concurrently and merges their output
pub struct Aggregator {
    sources: Vec<Arc<dyn ContestSource>>,
    source_timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator over `sources`, kept in invocation order
    pub fn new(sources: Vec<Arc<dyn ContestSource>>, source_timeout: Duration) -> Self {
        Self {
            sources,
            source_timeout,
        }
    }
}

#[async_trait]
impl ContestAggregator for Aggregator {
    /// Fetch contests from every source whose platform name is in `requested`
    ///
    /// Unknown names select nothing. Sources that fail contribute no
    /// records.
    ///
    /// # Errors
    ///
    /// Returns `Error::Aggregation` only when a source task is cancelled
    /// before it finishes.
    async fn aggregate(&self, requested: &[String]) -> Result<Vec<ContestRecord>> {
        let selected: Vec<Arc<dyn ContestSource>> = self
            .sources
            .iter()
            .filter(|source| requested.iter().any(|name| name == source.platform().as_str()))
            .cloned()
            .collect();

        let platforms: Vec<Platform> = selected.iter().map(|s| s.platform()).collect();

        let handles: Vec<_> = selected
            .into_iter()
            .map(|source| tokio::spawn(run_source(source, self.source_timeout)))
            .collect();

        let mut records = Vec::new();
        for (platform, joined) in platforms.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(contests) => records.extend(contests),
                Err(e) if e.is_panic() => {
                    tracing::error!(platform = %platform, "Contest source panicked");
                    metrics::record_source_fetch(platform.as_str(), SourceOutcome::Panic, 0.0, 0);
                }
                Err(e) => {
                    return Err(Error::aggregation(format!("{platform} task failed: {e}")));
                }
            }
        }

        let fetched = records.len();
        let records = finalize(records);
        tracing::info!(fetched, kept = records.len(), "Aggregated upcoming contests");

        Ok(records)
    }
}

/// Drop non-time-boxed contests and sort by start time
///
/// The sort is stable: records with the same start keep their input order.
pub fn finalize(mut records: Vec<ContestRecord>) -> Vec<ContestRecord> {
    records.retain(ContestRecord::is_time_boxed);
    records.sort_by_key(|record| record.start_time);
    records
}

/// Run one source to completion, turning every failure into an empty list
async fn run_source(source: Arc<dyn ContestSource>, timeout: Duration) -> Vec<ContestRecord> {
    let platform = source.platform();
    let started = Instant::now();

    let (outcome, records) = match tokio::time::timeout(timeout, source.fetch_contests()).await {
        Ok(Ok(records)) => {
            tracing::debug!(platform = %platform, count = records.len(), "Fetched contests");
            (SourceOutcome::Success, records)
        }
        Ok(Err(e)) => {
            tracing::warn!(platform = %platform, error = %e, "Contest source failed");
            (SourceOutcome::Failure, Vec::new())
        }
        Err(_) => {
            tracing::error!(
                platform = %platform,
                timeout_secs = timeout.as_secs(),
                "Contest source timed out"
            );
            (SourceOutcome::Timeout, Vec::new())
        }
    };

    metrics::record_source_fetch(
        platform.as_str(),
        outcome,
        started.elapsed().as_secs_f64(),
        records.len(),
    );

    records
}
