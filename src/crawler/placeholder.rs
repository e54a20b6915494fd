//! Platforms without a usable public contest feed

use async_trait::async_trait;

use crate::crawler::ContestSource;
use crate::models::{ContestRecord, Platform};
use crate::utils::error::SourceError;

/// Source that always reports no contests (GeeksforGeeks, CodingNinjas)
///
/// An empty list here is the expected answer, not a failure.
pub struct PlaceholderSource {
    platform: Platform,
}

impl PlaceholderSource {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl ContestSource for PlaceholderSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        Ok(Vec::new())
    }
}
