//! Upcoming-contests request handling
//!
//! Glues the freshness cache to the aggregator: serve from cache while the
//! entry is fresh, otherwise aggregate, store and serve.

use chrono::{DateTime, Utc};

use crate::aggregator::ContestAggregator;
use crate::cache::{CacheStatus, ContestCache};
use crate::config::CacheScope;
use crate::error::Result;
use crate::metrics;
use crate::models::{default_platform_names, ContestRecord, UpcomingContests};

/// Parse the `platforms` query parameter
///
/// The value is a JSON array of platform names. Anything else (absent,
/// invalid JSON, not an array, non-string elements) selects every known
/// platform. Duplicates are removed, keeping first occurrences.
pub fn parse_platforms(raw: Option<&str>) -> Vec<String> {
    let Some(parsed) = raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok()) else {
        return default_platform_names();
    };

    let mut platforms: Vec<String> = Vec::with_capacity(parsed.len());
    for name in parsed {
        if !platforms.contains(&name) {
            platforms.push(name);
        }
    }
    platforms
}

/// Cache-fronted access to the aggregated contest list
pub struct ContestService {
    aggregator: Box<dyn ContestAggregator>,
    cache: ContestCache,
    scope: CacheScope,
}

impl ContestService {
    pub fn new(
        aggregator: impl ContestAggregator + 'static,
        cache: ContestCache,
        scope: CacheScope,
    ) -> Self {
        Self {
            aggregator: Box::new(aggregator),
            cache,
            scope,
        }
    }

    /// Cache status at `now`
    pub async fn cache_status(&self, now: DateTime<Utc>) -> CacheStatus {
        self.cache.status(now).await
    }

    /// Upcoming contests for `requested` platforms as of `now`
    ///
    /// With [`CacheScope::AllPlatforms`] a miss aggregates every known
    /// platform and the response is narrowed to `requested`. With
    /// [`CacheScope::Requested`] only `requested` is aggregated and cached,
    /// so a narrow request can leave later broad requests short of
    /// platforms until the entry expires.
    ///
    /// # Errors
    ///
    /// Propagates `Error::Aggregation` from the aggregator.
    pub async fn upcoming(&self, requested: Vec<String>, now: DateTime<Utc>) -> Result<UpcomingContests> {
        if let Some(entry) = self.cache.lookup(now).await {
            metrics::record_cache_lookup(true);
            tracing::debug!(
                age_secs = (now - entry.fetched_at).num_seconds(),
                "Serving upcoming contests from cache"
            );
            return Ok(UpcomingContests {
                upcoming_contests: filter_platforms(&entry.records, &requested),
                platforms: requested,
                cached: true,
            });
        }

        metrics::record_cache_lookup(false);

        let targets = match self.scope {
            CacheScope::AllPlatforms => default_platform_names(),
            CacheScope::Requested => requested.clone(),
        };

        let records = self.aggregator.aggregate(&targets).await?;
        let records = self.cache.store(records, now).await;

        Ok(UpcomingContests {
            upcoming_contests: filter_platforms(&records, &requested),
            platforms: requested,
            cached: false,
        })
    }
}

fn filter_platforms(records: &[ContestRecord], requested: &[String]) -> Vec<ContestRecord> {
    records
        .iter()
        .filter(|record| requested.iter().any(|name| name == record.platform.as_str()))
        .cloned()
        .collect()
}
