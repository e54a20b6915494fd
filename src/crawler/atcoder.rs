//! AtCoder contest source (HTML scraping)

use async_trait::async_trait;
use std::sync::Arc;

use crate::crawler::ContestSource;
use crate::models::{ContestRecord, Platform};
use crate::parser::{fetch_and_parse, parse_contest_rows, ContestRow, PageFetcher};
use crate::utils::error::{ParseError, SourceError};
use crate::utils::time::{parse_compact_jst, parse_hhmm_minutes};

/// AtCoder contest listing page
pub const ATCODER_CONTESTS_URL: &str = "https://atcoder.jp/contests/";

const ATCODER_SITE_URL: &str = "https://atcoder.jp";

/// AtCoder running + upcoming contest adapter
pub struct AtCoderSource {
    pages: Arc<dyn PageFetcher>,
    contests_url: String,
}

impl AtCoderSource {
    pub fn new(pages: Arc<dyn PageFetcher>) -> Self {
        Self::with_base_url(pages, ATCODER_CONTESTS_URL)
    }

    /// Read the listing from another URL (mock servers in tests)
    pub fn with_base_url(pages: Arc<dyn PageFetcher>, contests_url: &str) -> Self {
        Self {
            pages,
            contests_url: contests_url.to_string(),
        }
    }
}

/// Normalize one scraped row
///
/// The start link carries a JST wall-clock time; duration comes from the
/// `H:MM` cell and determines `end_time`.
pub fn row_to_record(row: &ContestRow) -> Result<ContestRecord, ParseError> {
    let start = parse_compact_jst(&row.start_param()?)?;
    let minutes = parse_hhmm_minutes(&row.duration)?;

    let name = if row.name.is_empty() {
        Platform::AtCoder.default_contest_name().to_string()
    } else {
        row.name.clone()
    };

    let url = match row.link.as_deref() {
        Some(link) if link.contains("://") => link.to_string(),
        Some(link) => format!("{ATCODER_SITE_URL}{link}"),
        None => format!("{ATCODER_SITE_URL}/contests/"),
    };

    Ok(ContestRecord::from_minutes(
        Platform::AtCoder,
        name,
        url,
        start,
        minutes,
    ))
}

#[async_trait]
impl ContestSource for AtCoderSource {
    fn platform(&self) -> Platform {
        Platform::AtCoder
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        let rows = fetch_and_parse(self.pages.as_ref(), &self.contests_url, parse_contest_rows).await?;

        let records = rows
            .iter()
            .filter_map(|row| match row_to_record(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(name = %row.name, error = %e, "Skipping AtCoder row");
                    None
                }
            })
            .collect();

        Ok(records)
    }
}
