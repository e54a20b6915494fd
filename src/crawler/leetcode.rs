//! LeetCode contest source (GraphQL API)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::ContestSource;
use crate::models::{ContestRecord, Platform};
use crate::utils::error::SourceError;
use crate::utils::non_empty_or;

/// LeetCode GraphQL endpoint
pub const LEETCODE_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

const LEETCODE_SITE_URL: &str = "https://leetcode.com";

const TOP_TWO_CONTESTS_QUERY: &str = "{
  topTwoContests {
    title
    startTime
    duration
    titleSlug
  }
}";

/// GraphQL request body
#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// GraphQL response envelope; `data` may be absent on errors
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopTwoContests {
    #[serde(default)]
    top_two_contests: Vec<LeetCodeContest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeetCodeContest {
    #[serde(default)]
    title: Option<String>,
    start_time: f64,
    duration: i64,
    #[serde(default)]
    title_slug: String,
}

/// LeetCode `topTwoContests` adapter
pub struct LeetCodeSource {
    fetcher: Arc<HttpFetcher>,
    graphql_url: String,
}

impl LeetCodeSource {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self::with_base_url(fetcher, LEETCODE_GRAPHQL_URL)
    }

    /// Point the adapter at another GraphQL endpoint (mock servers in tests)
    pub fn with_base_url(fetcher: Arc<HttpFetcher>, graphql_url: &str) -> Self {
        Self {
            fetcher,
            graphql_url: graphql_url.to_string(),
        }
    }
}

#[async_trait]
impl ContestSource for LeetCodeSource {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    async fn fetch_contests(&self) -> Result<Vec<ContestRecord>, SourceError> {
        let request = GraphQlRequest::<()> {
            query: TOP_TWO_CONTESTS_QUERY,
            variables: None,
        };
        let response: GraphQlResponse<TopTwoContests> =
            self.fetcher.post_json(&self.graphql_url, &request).await?;

        let contests = response
            .data
            .map(|d| d.top_two_contests)
            .unwrap_or_default();

        Ok(contests
            .into_iter()
            .map(|contest| {
                ContestRecord::from_seconds(
                    Platform::LeetCode,
                    non_empty_or(contest.title.as_deref(), Platform::LeetCode.default_contest_name()),
                    format!("{LEETCODE_SITE_URL}/contest/{}", contest.title_slug),
                    contest.start_time.floor() as i64,
                    contest.duration,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GraphQlRequest::<()> {
            query: TOP_TWO_CONTESTS_QUERY,
            variables: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["query"].as_str().unwrap().contains("topTwoContests"));
        assert!(value.get("variables").is_none());
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: GraphQlResponse<TopTwoContests> =
            serde_json::from_str(r#"{"errors":[{"message":"boom"}]}"#).unwrap();
        assert!(response.data.is_none());
    }
}
