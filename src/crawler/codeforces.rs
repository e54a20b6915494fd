//! Codeforces contest source (JSON API)

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::ContestSource;
use crate::models::{ContestRecord, Platform};
use crate::utils::error::SourceError;
use crate::utils::non_empty_or;

/// Codeforces public API root
pub const CODEFORCES_API_URL: &str = "https://codeforces.com/api";

const CODEFORCES_SITE_URL: &str = "https://codeforces.com";

/// Envelope shared by every Codeforces API method
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap `result`, turning `status != "OK"` into an upstream failure
    pub fn into_result(self) -> Result<T, String> {
        if self.status != "OK" {
            return Err(self
                .comment
                .unwrap_or_else(|| format!("status {}", self.status)));
        }
        self.result.ok_or_else(|| String::from("missing result"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeforcesContest {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    phase: String,
    duration_seconds: i64,
    #[serde(default)]
    start_time_seconds: Option<i64>,
}

impl CodeforcesContest {
    /// Not yet started or currently running
    fn is_relevant(&self) -> bool {
        matches!(self.phase.as_str(), "BEFORE" | "CODING")
    }
}

/// Codeforces `contest.list` adapter
pub struct CodeforcesSource {
    fetcher: Arc<HttpFetcher>,
    api_url: String,
}

impl CodeforcesSource {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self::with_base_url(fetcher, CODEFORCES_API_URL)
    }

    /// Point the adapter at another API root (mock servers in tests)
    pub fn with_base_url(fetcher: Arc<HttpFetcher>, api_url: &str) -> Self {
        Self {
            fetcher,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContestSource for CodeforcesSource {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        let url = format!("{}/contest.list", self.api_url);
        let envelope: ApiEnvelope<Vec<CodeforcesContest>> = self.fetcher.get_json(&url).await?;
        let contests = envelope.into_result().map_err(SourceError::Upstream)?;

        let records = contests
            .into_iter()
            .filter(CodeforcesContest::is_relevant)
            .filter_map(|contest| {
                let Some(start) = contest.start_time_seconds else {
                    tracing::debug!(id = contest.id, "Skipping Codeforces contest without start time");
                    return None;
                };
                Some(ContestRecord::from_seconds(
                    Platform::Codeforces,
                    non_empty_or(contest.name.as_deref(), Platform::Codeforces.default_contest_name()),
                    format!("{CODEFORCES_SITE_URL}/contest/{}", contest.id),
                    start,
                    contest.duration_seconds,
                ))
            })
            .collect();

        Ok(records)
    }
}
