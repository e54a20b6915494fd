//! CodeChef contest source (JSON listing API)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::ContestSource;
use crate::models::{ContestRecord, Platform};
use crate::utils::error::{ParseError, SourceError};
use crate::utils::non_empty_or;
use crate::utils::time::{parse_iso_to_epoch, seconds_to_minutes};

/// CodeChef contest listing endpoint
pub const CODECHEF_LIST_URL: &str = "https://www.codechef.com/api/list/contests/all";

const CODECHEF_SITE_URL: &str = "https://www.codechef.com";

/// Duration assumed when the listing gives none
pub const DEFAULT_DURATION_MINUTES: i64 = 120;

#[derive(Debug, Default, Deserialize)]
struct ContestListing {
    #[serde(default)]
    present_contests: Option<Vec<CodeChefContest>>,
    #[serde(default)]
    future_contests: Option<Vec<CodeChefContest>>,
}

#[derive(Debug, Deserialize)]
struct CodeChefContest {
    #[serde(default)]
    contest_code: String,
    #[serde(default)]
    contest_name: Option<String>,
    #[serde(default)]
    contest_start_date_iso: Option<String>,
    #[serde(default)]
    contest_end_date_iso: Option<String>,
    /// Minutes, sent as either a number or a numeric string
    #[serde(default)]
    duration: Option<Value>,
}

impl CodeChefContest {
    fn into_record(self) -> Result<ContestRecord, ParseError> {
        let start = self
            .contest_start_date_iso
            .as_deref()
            .ok_or(ParseError::MissingField("contest_start_date_iso"))
            .and_then(parse_iso_to_epoch)?;

        let end = self
            .contest_end_date_iso
            .as_deref()
            .and_then(|raw| parse_iso_to_epoch(raw).ok())
            .filter(|end| *end >= start);

        let duration = self
            .duration
            .as_ref()
            .and_then(lenient_minutes)
            .or_else(|| end.map(|end| seconds_to_minutes(end - start)))
            .unwrap_or(DEFAULT_DURATION_MINUTES);

        Ok(ContestRecord::from_minutes(
            Platform::CodeChef,
            non_empty_or(self.contest_name.as_deref(), Platform::CodeChef.default_contest_name()),
            format!("{CODECHEF_SITE_URL}/{}", self.contest_code),
            start,
            duration,
        ))
    }
}

/// Positive minute count from a JSON number or numeric string
fn lenient_minutes(value: &Value) -> Option<i64> {
    let minutes = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (minutes > 0).then_some(minutes)
}

/// CodeChef present + future contest adapter
pub struct CodeChefSource {
    fetcher: Arc<HttpFetcher>,
    list_url: String,
}

impl CodeChefSource {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self::with_base_url(fetcher, CODECHEF_LIST_URL)
    }

    /// Point the adapter at another listing endpoint (mock servers in tests)
    pub fn with_base_url(fetcher: Arc<HttpFetcher>, list_url: &str) -> Self {
        Self {
            fetcher,
            list_url: list_url.to_string(),
        }
    }
}

#[async_trait]
impl ContestSource for CodeChefSource {
    fn platform(&self) -> Platform {
        Platform::CodeChef
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        let query = [
            ("sort_by", String::from("START")),
            ("sorting_order", String::from("asc")),
            ("offset", String::from("0")),
            ("mode", String::from("all")),
        ];
        let listing: ContestListing = self
            .fetcher
            .get_json_with_query(&self.list_url, &query)
            .await?;

        let contests = listing
            .present_contests
            .unwrap_or_default()
            .into_iter()
            .chain(listing.future_contests.unwrap_or_default());

        let mut records = Vec::new();
        for contest in contests {
            let code = contest.contest_code.clone();
            match contest.into_record() {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(code = %code, error = %e, "Skipping CodeChef contest");
                }
            }
        }

        Ok(records)
    }
}
