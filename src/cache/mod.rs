//! In-memory freshness cache for aggregated contests
//!
//! Holds the last aggregation result and when it was fetched. The entry is
//! replaced wholesale on every store; readers get an `Arc` snapshot, so a
//! store never mutates a list someone is still filtering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::ContestRecord;

/// One aggregation result
#[derive(Debug, Clone)]
pub struct CachedContests {
    pub records: Arc<Vec<ContestRecord>>,
    pub fetched_at: DateTime<Utc>,
}

/// TTL cache for the upcoming-contests list
pub struct ContestCache {
    entry: RwLock<Option<CachedContests>>,
    ttl: Duration,
}

impl ContestCache {
    /// Create an empty cache with the given freshness window
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    /// Snapshot of the entry if it is younger than the TTL at `now`
    pub async fn lookup(&self, now: DateTime<Utc>) -> Option<CachedContests> {
        let guard = self.entry.read().await;
        guard
            .as_ref()
            .filter(|entry| self.is_fresh(entry.fetched_at, now))
            .cloned()
    }

    /// Replace the entry with a new aggregation result
    pub async fn store(&self, records: Vec<ContestRecord>, now: DateTime<Utc>) -> Arc<Vec<ContestRecord>> {
        let records = Arc::new(records);
        *self.entry.write().await = Some(CachedContests {
            records: Arc::clone(&records),
            fetched_at: now,
        });
        records
    }

    /// Current cache status at `now`
    pub async fn status(&self, now: DateTime<Utc>) -> CacheStatus {
        let guard = self.entry.read().await;
        match guard.as_ref() {
            Some(entry) => CacheStatus {
                has_entry: true,
                is_fresh: self.is_fresh(entry.fetched_at, now),
                age_seconds: (now - entry.fetched_at).num_seconds(),
                records: entry.records.len(),
            },
            None => CacheStatus {
                has_entry: false,
                is_fresh: false,
                age_seconds: 0,
                records: 0,
            },
        }
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            // fetched "in the future": clock went backwards
            Err(_) => true,
        }
    }
}

/// Cache status information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub has_entry: bool,
    pub is_fresh: bool,
    pub age_seconds: i64,
    pub records: usize,
}
