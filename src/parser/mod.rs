//! HTML parsing and data extraction
//!
//! Scraping is split in two: a [`PageFetcher`] that only knows how to get a
//! page body, and pure parsers that turn a body into structured rows. The
//! parsers never touch the network, so they are tested against saved pages.

pub mod contests;
pub mod profile;
pub mod selectors;

// Re-export main parsers and public types
pub use contests::{parse_contest_rows, ContestRow};
pub use profile::{parse_atcoder_solved, parse_codechef_solved};
pub use selectors::ContestTable;

use async_trait::async_trait;

use crate::crawler::fetcher::HttpFetcher;
use crate::utils::error::FetchError;

/// Capability to fetch an HTML page as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the decoded body
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}

/// Fetch a page and run a parser over it
///
/// The parsed document never crosses an await point.
///
/// # Errors
///
/// Returns the fetch error; parsing itself is infallible here and reports
/// absence through `T`.
pub async fn fetch_and_parse<T, F>(
    fetcher: &dyn PageFetcher,
    url: &str,
    parse: F,
) -> Result<T, FetchError>
where
    F: FnOnce(&str) -> T,
{
    let body = fetcher.fetch_page(url).await?;
    Ok(parse(&body))
}
