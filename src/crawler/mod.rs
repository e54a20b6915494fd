//! Contest sources
//!
//! Each platform gets one [`ContestSource`] that knows how to query or scrape
//! exactly one upstream and turn it into [`ContestRecord`]s. Sources report
//! failures through [`SourceError`]; the aggregator decides what a failure
//! means for the overall response.

pub mod atcoder;
pub mod codechef;
pub mod codeforces;
pub mod fetcher;
pub mod leetcode;
pub mod placeholder;

pub use atcoder::AtCoderSource;
pub use codechef::CodeChefSource;
pub use codeforces::CodeforcesSource;
pub use fetcher::HttpFetcher;
pub use leetcode::LeetCodeSource;
pub use placeholder::PlaceholderSource;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{ContestRecord, Platform};
use crate::utils::error::SourceError;

/// One upstream contest listing
#[async_trait]
pub trait ContestSource: Send + Sync {
    /// Platform every record from this source is tagged with
    fn platform(&self) -> Platform;

    /// Fetch and normalize the current and upcoming contests
    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError>;
}

/// Sources for every known platform, in [`Platform::ALL`] order
pub fn default_sources(fetcher: Arc<HttpFetcher>) -> Vec<Arc<dyn ContestSource>> {
    Platform::ALL
        .into_iter()
        .map(|platform| -> Arc<dyn ContestSource> {
            match platform {
                Platform::Codeforces => Arc::new(CodeforcesSource::new(Arc::clone(&fetcher))),
                Platform::LeetCode => Arc::new(LeetCodeSource::new(Arc::clone(&fetcher))),
                Platform::CodeChef => Arc::new(CodeChefSource::new(Arc::clone(&fetcher))),
                Platform::AtCoder => Arc::new(AtCoderSource::new(fetcher.clone())),
                Platform::GeeksforGeeks | Platform::CodingNinjas => {
                    Arc::new(PlaceholderSource::new(platform))
                }
            }
        })
        .collect()
}
