//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cptracker::aggregator::ContestAggregator;
use cptracker::crawler::{ContestSource, HttpFetcher};
use cptracker::error::Error;
use cptracker::models::{ContestRecord, Platform};
use cptracker::utils::error::{FetchError, SourceError};

/// Saved copy of the AtCoder contest listing
pub const ATCODER_CONTESTS_HTML: &str = include_str!("../fixtures/atcoder_contests.html");

/// Fetcher with one fast retry, suitable for mock servers
pub fn test_fetcher() -> Arc<HttpFetcher> {
    Arc::new(
        HttpFetcher::with_config(1, Duration::from_secs(5))
            .expect("client")
            .with_base_delay_ms(1),
    )
}

/// Create a contest record with a placeholder URL
pub fn record(platform: Platform, name: &str, start: i64, minutes: i64) -> ContestRecord {
    ContestRecord::from_minutes(
        platform,
        name,
        format!("https://example.com/{}", name.replace(' ', "-")),
        start,
        minutes,
    )
}

/// Source returning canned records (or failing) and counting its calls
pub struct ScriptedSource {
    platform: Platform,
    records: Option<Vec<ContestRecord>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn ok(platform: Platform, records: Vec<ContestRecord>) -> Self {
        Self {
            platform,
            records: Some(records),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            platform,
            records: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the call counter, usable after the source is moved
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ContestSource for ScriptedSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.records {
            Some(records) => Ok(records.clone()),
            None => Err(SourceError::Fetch(FetchError::ServerError(503))),
        }
    }
}

/// Source that panics when fetched
pub struct PanickingSource(pub Platform);

#[async_trait]
impl ContestSource for PanickingSource {
    fn platform(&self) -> Platform {
        self.0
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        panic!("{} source exploded", self.0)
    }
}

/// Aggregator whose task plumbing always breaks
pub struct BrokenAggregator {
    calls: Arc<AtomicUsize>,
}

impl BrokenAggregator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ContestAggregator for BrokenAggregator {
    async fn aggregate(&self, _requested: &[String]) -> Result<Vec<ContestRecord>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::aggregation("Codeforces task failed: task was cancelled"))
    }
}

/// One scripted source per known platform, each with a single contest
///
/// Contest `i` starts at `1_000 * (i + 1)`.
pub fn one_contest_per_platform() -> Vec<ScriptedSource> {
    Platform::ALL
        .iter()
        .enumerate()
        .map(|(i, platform)| {
            ScriptedSource::ok(
                *platform,
                vec![record(
                    *platform,
                    &format!("{platform} Round"),
                    1_000 * (i as i64 + 1),
                    120,
                )],
            )
        })
        .collect()
}

pub fn as_sources(sources: Vec<ScriptedSource>) -> Vec<Arc<dyn ContestSource>> {
    sources
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn ContestSource>)
        .collect()
}

pub fn names(platforms: &[&str]) -> Vec<String> {
    platforms.iter().map(|p| p.to_string()).collect()
}
