//! Per-user submission and solved-count lookups
//!
//! Each lookup is one upstream call wrapped into a [`SubmissionSummary`] or
//! [`SolvedStats`]. Nothing here is cached.
//!
//! | Platform   | Submissions                  | Solved count                   |
//! |------------|------------------------------|--------------------------------|
//! | Codeforces | `user.status`, first 100     | unique OK problems             |
//! | LeetCode   | GraphQL recent submissions   | GraphQL `acSubmissionNum`      |
//! | CodeChef   | not available (note)         | profile page scrape            |
//! | AtCoder    | kenkoooo API, last 24 hours  | profile page scrape            |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::crawler::codeforces::{ApiEnvelope, CODEFORCES_API_URL};
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::leetcode::{GraphQlRequest, GraphQlResponse, LEETCODE_GRAPHQL_URL};
use crate::models::{AcceptedSubmission, DifficultyCount, Platform, SolvedStats, SubmissionSummary};
use crate::parser::{fetch_and_parse, parse_atcoder_solved, parse_codechef_solved, PageFetcher};
use crate::utils::error::{FetchError, StatsError};

/// Most accepted submissions listed per response (Codeforces, AtCoder)
pub const MAX_LISTED_SUBMISSIONS: usize = 10;

/// Codeforces submissions inspected for today's count
pub const CODEFORCES_RECENT_COUNT: u32 = 100;

/// Window of the AtCoder submissions query
pub const ATCODER_LOOKBACK_SECS: i64 = 24 * 60 * 60;

const CODECHEF_SUBMISSIONS_NOTE: &str =
    "CodeChef API requires authentication. Manual logging recommended.";

const CODEFORCES_STATS_NOTE: &str =
    "Count from rated contests only (API limitation - does not include practice/gym)";

const LEETCODE_PROFILE_QUERY: &str = "query getUserProfile($username: String!) {
  matchedUser(username: $username) {
    submitStats {
      acSubmissionNum {
        difficulty
        count
      }
    }
    recentSubmissionList(limit: 20) {
      title
      titleSlug
      timestamp
      statusDisplay
    }
  }
}";

/// Upstream locations used by [`StatsClient`]
#[derive(Debug, Clone)]
pub struct StatsEndpoints {
    pub codeforces_api: String,
    pub leetcode_graphql: String,
    pub atcoder_submissions: String,
    pub atcoder_users: String,
    pub codechef_users: String,
}

impl Default for StatsEndpoints {
    fn default() -> Self {
        Self {
            codeforces_api: CODEFORCES_API_URL.to_string(),
            leetcode_graphql: LEETCODE_GRAPHQL_URL.to_string(),
            atcoder_submissions: String::from(
                "https://kenkoooo.com/atcoder/atcoder-api/v3/user/submissions",
            ),
            atcoder_users: String::from("https://atcoder.jp/users/"),
            codechef_users: String::from("https://www.codechef.com/users/"),
        }
    }
}

impl StatsEndpoints {
    /// Every endpoint rooted at one base URL (mock servers in tests)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            codeforces_api: format!("{base}/api"),
            leetcode_graphql: format!("{base}/graphql"),
            atcoder_submissions: format!("{base}/atcoder/atcoder-api/v3/user/submissions"),
            atcoder_users: format!("{base}/users/"),
            codechef_users: format!("{base}/codechef/users/"),
        }
    }
}

// ============================================================================
// Upstream payloads
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeforcesSubmission {
    creation_time_seconds: i64,
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default)]
    problem: CodeforcesProblem,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeforcesProblem {
    #[serde(default)]
    contest_id: Option<i64>,
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl CodeforcesProblem {
    fn id(&self) -> String {
        format!(
            "{}{}",
            self.contest_id.map(|id| id.to_string()).unwrap_or_default(),
            self.index.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Serialize)]
struct UsernameVariables<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUserData {
    matched_user: Option<LeetCodeUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeetCodeUser {
    #[serde(default)]
    submit_stats: Option<SubmitStats>,
    #[serde(default)]
    recent_submission_list: Option<Vec<LeetCodeSubmission>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeetCodeSubmission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_slug: String,
    /// Epoch seconds, sent as a string
    #[serde(deserialize_with = "lenient_epoch")]
    timestamp: i64,
    #[serde(default)]
    status_display: String,
}

#[derive(Debug, Deserialize)]
struct AtCoderSubmission {
    epoch_second: i64,
    problem_id: String,
    result: String,
}

fn lenient_epoch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("invalid timestamp: {other}"))),
    }
}

/// Whether `epoch_secs` falls on the same UTC calendar day as `now`
fn is_same_utc_day(epoch_secs: i64, now: DateTime<Utc>) -> bool {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|t| t.date_naive() == now.date_naive())
        .unwrap_or(false)
}

// ============================================================================
// Client
// ============================================================================

/// Per-user submission and stats lookups
pub struct StatsClient {
    fetcher: Arc<HttpFetcher>,
    pages: Arc<dyn PageFetcher>,
    endpoints: StatsEndpoints,
}

impl StatsClient {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self::with_endpoints(fetcher, StatsEndpoints::default())
    }

    pub fn with_endpoints(fetcher: Arc<HttpFetcher>, endpoints: StatsEndpoints) -> Self {
        let pages: Arc<dyn PageFetcher> = fetcher.clone();
        Self {
            fetcher,
            pages,
            endpoints,
        }
    }

    /// Use another page fetcher for the scraped profile pages
    #[must_use]
    pub fn with_page_fetcher(mut self, pages: Arc<dyn PageFetcher>) -> Self {
        self.pages = pages;
        self
    }

    /// Accepted submissions `username` made on the UTC day of `now`
    ///
    /// # Errors
    ///
    /// `StatsError::InvalidUser` when the upstream does not know the user,
    /// `StatsError::UnsupportedPlatform` for platforms without a source, and
    /// fetch errors otherwise.
    pub async fn submissions(
        &self,
        platform: Platform,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionSummary, StatsError> {
        let (recent_accepted, today_count, note) = match platform {
            Platform::Codeforces => {
                let (listed, count) = self.codeforces_submissions(username, now).await?;
                (listed, count, None)
            }
            Platform::LeetCode => {
                let listed = self.leetcode_submissions(username, now).await?;
                let count = listed.len();
                (listed, count, None)
            }
            Platform::AtCoder => {
                let (listed, count) = self.atcoder_submissions(username, now).await?;
                (listed, count, None)
            }
            Platform::CodeChef => (Vec::new(), 0, Some(CODECHEF_SUBMISSIONS_NOTE.to_string())),
            Platform::GeeksforGeeks | Platform::CodingNinjas => {
                return Err(StatsError::UnsupportedPlatform(platform.to_string()));
            }
        };

        Ok(SubmissionSummary {
            platform,
            username: username.to_string(),
            today_count,
            recent_accepted,
            note,
        })
    }

    /// Lifetime solved count for `username`
    ///
    /// Scraped platforms (AtCoder, CodeChef) never fail: a page that cannot
    /// be fetched yields zero with a note.
    ///
    /// # Errors
    ///
    /// Same as [`StatsClient::submissions`] for the API-backed platforms.
    pub async fn stats(&self, platform: Platform, username: &str) -> Result<SolvedStats, StatsError> {
        match platform {
            Platform::Codeforces => self.codeforces_stats(username).await,
            Platform::LeetCode => self.leetcode_stats(username).await,
            Platform::AtCoder => {
                let url = profile_url(&self.endpoints.atcoder_users, username)?;
                Ok(self
                    .scraped_stats(platform, username, &url, |html| {
                        parse_atcoder_solved(html).unwrap_or(0)
                    })
                    .await)
            }
            Platform::CodeChef => {
                let url = profile_url(&self.endpoints.codechef_users, username)?;
                Ok(self
                    .scraped_stats(platform, username, &url, parse_codechef_solved)
                    .await)
            }
            Platform::GeeksforGeeks | Platform::CodingNinjas => {
                Err(StatsError::UnsupportedPlatform(platform.to_string()))
            }
        }
    }

    // ------------------------------------------------------------------
    // Codeforces
    // ------------------------------------------------------------------

    async fn codeforces_status(
        &self,
        username: &str,
        count: Option<u32>,
    ) -> Result<Vec<CodeforcesSubmission>, StatsError> {
        let url = format!("{}/user.status", self.endpoints.codeforces_api.trim_end_matches('/'));
        let mut query = vec![("handle", username.to_string())];
        if let Some(count) = count {
            query.push(("from", String::from("1")));
            query.push(("count", count.to_string()));
        }

        // Unknown handles come back as 400 with status FAILED
        let envelope: ApiEnvelope<Vec<CodeforcesSubmission>> =
            match self.fetcher.get_json_with_query(&url, &query).await {
                Ok(envelope) => envelope,
                Err(FetchError::ServerError(400)) => {
                    return Err(StatsError::InvalidUser(username.to_string()))
                }
                Err(e) => return Err(e.into()),
            };

        envelope.into_result().map_err(|comment| {
            tracing::debug!(username, comment = %comment, "Codeforces rejected handle");
            StatsError::InvalidUser(username.to_string())
        })
    }

    async fn codeforces_submissions(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<(Vec<AcceptedSubmission>, usize), StatsError> {
        let submissions = self
            .codeforces_status(username, Some(CODEFORCES_RECENT_COUNT))
            .await?;

        let today: Vec<AcceptedSubmission> = submissions
            .into_iter()
            .filter(|s| s.verdict.as_deref() == Some("OK"))
            .filter(|s| is_same_utc_day(s.creation_time_seconds, now))
            .map(|s| AcceptedSubmission {
                problem_id: s.problem.id(),
                problem_name: s.problem.name.unwrap_or_else(|| String::from("Unknown")),
                timestamp: s.creation_time_seconds,
            })
            .collect();

        let count = today.len();
        Ok((today.into_iter().take(MAX_LISTED_SUBMISSIONS).collect(), count))
    }

    async fn codeforces_stats(&self, username: &str) -> Result<SolvedStats, StatsError> {
        let submissions = self.codeforces_status(username, None).await?;

        let solved: HashSet<(Option<i64>, Option<&str>)> = submissions
            .iter()
            .filter(|s| s.verdict.as_deref() == Some("OK"))
            .map(|s| (s.problem.contest_id, s.problem.index.as_deref()))
            .collect();

        Ok(SolvedStats {
            total_submissions: Some(submissions.len()),
            note: Some(CODEFORCES_STATS_NOTE.to_string()),
            ..SolvedStats::new(Platform::Codeforces, username, solved.len() as u64)
        })
    }

    // ------------------------------------------------------------------
    // LeetCode
    // ------------------------------------------------------------------

    async fn leetcode_user(&self, username: &str) -> Result<LeetCodeUser, StatsError> {
        let request = GraphQlRequest {
            query: LEETCODE_PROFILE_QUERY,
            variables: Some(UsernameVariables { username }),
        };
        let response: GraphQlResponse<MatchedUserData> = self
            .fetcher
            .post_json(&self.endpoints.leetcode_graphql, &request)
            .await?;

        response
            .data
            .and_then(|d| d.matched_user)
            .ok_or_else(|| StatsError::InvalidUser(username.to_string()))
    }

    async fn leetcode_submissions(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AcceptedSubmission>, StatsError> {
        let user = self.leetcode_user(username).await?;

        Ok(user
            .recent_submission_list
            .unwrap_or_default()
            .into_iter()
            .filter(|s| s.status_display == "Accepted")
            .filter(|s| is_same_utc_day(s.timestamp, now))
            .map(|s| AcceptedSubmission {
                problem_name: s.title,
                problem_id: s.title_slug,
                timestamp: s.timestamp,
            })
            .collect())
    }

    async fn leetcode_stats(&self, username: &str) -> Result<SolvedStats, StatsError> {
        let user = self.leetcode_user(username).await?;
        let breakdown = user
            .submit_stats
            .map(|s| s.ac_submission_num)
            .unwrap_or_default();

        // "All" already sums the other buckets
        let total: u64 = breakdown
            .iter()
            .filter(|d| d.difficulty != "All")
            .map(|d| d.count)
            .sum();

        Ok(SolvedStats {
            breakdown: Some(breakdown),
            ..SolvedStats::new(Platform::LeetCode, username, total)
        })
    }

    // ------------------------------------------------------------------
    // AtCoder / CodeChef
    // ------------------------------------------------------------------

    async fn atcoder_submissions(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<(Vec<AcceptedSubmission>, usize), StatsError> {
        let query = [
            ("user", username.to_string()),
            ("from_second", (now.timestamp() - ATCODER_LOOKBACK_SECS).to_string()),
        ];
        let submissions: Vec<AtCoderSubmission> = self
            .fetcher
            .get_json_with_query(&self.endpoints.atcoder_submissions, &query)
            .await?;

        let today: Vec<AcceptedSubmission> = submissions
            .into_iter()
            .filter(|s| s.result == "AC")
            .filter(|s| is_same_utc_day(s.epoch_second, now))
            .map(|s| AcceptedSubmission {
                problem_name: s.problem_id.clone(),
                problem_id: s.problem_id,
                timestamp: s.epoch_second,
            })
            .collect();

        let count = today.len();
        Ok((today.into_iter().take(MAX_LISTED_SUBMISSIONS).collect(), count))
    }

    async fn scraped_stats<F>(&self, platform: Platform, username: &str, url: &str, parse: F) -> SolvedStats
    where
        F: FnOnce(&str) -> u64,
    {
        match fetch_and_parse(self.pages.as_ref(), url, parse).await {
            Ok(solved) => SolvedStats::new(platform, username, solved),
            Err(e) => {
                tracing::warn!(platform = %platform, username, error = %e, "Profile page unavailable");
                SolvedStats::unavailable(platform, username)
            }
        }
    }
}

/// `base` with `username` appended as one escaped path segment
fn profile_url(base: &str, username: &str) -> Result<String, StatsError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(username);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_same_utc_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap().timestamp();

        assert!(is_same_utc_day(midnight, now));
        assert!(is_same_utc_day(midnight + 86_399, now));
        assert!(!is_same_utc_day(midnight - 1, now));
    }

    #[test]
    fn test_profile_url_escapes_username() {
        assert_eq!(
            profile_url("https://atcoder.jp/users/", "tourist").unwrap(),
            "https://atcoder.jp/users/tourist"
        );
        assert_eq!(
            profile_url("https://www.codechef.com/users/", "a/b").unwrap(),
            "https://www.codechef.com/users/a%2Fb"
        );
    }

    #[test]
    fn test_leetcode_timestamp_accepts_string_and_number() {
        let subs: Vec<LeetCodeSubmission> = serde_json::from_str(
            r#"[
                {"title":"Two Sum","titleSlug":"two-sum","timestamp":"1710072000","statusDisplay":"Accepted"},
                {"title":"Add","titleSlug":"add","timestamp":1710072001,"statusDisplay":"Wrong Answer"}
            ]"#,
        )
        .unwrap();
        assert_eq!(subs[0].timestamp, 1_710_072_000);
        assert_eq!(subs[1].timestamp, 1_710_072_001);
    }

    #[test]
    fn test_codeforces_problem_id() {
        let problem = CodeforcesProblem {
            contest_id: Some(1900),
            index: Some(String::from("B")),
            name: None,
        };
        assert_eq!(problem.id(), "1900B");
        assert_eq!(CodeforcesProblem::default().id(), "");
    }

    #[test]
    fn test_endpoints_from_base() {
        let endpoints = StatsEndpoints::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(endpoints.codeforces_api, "http://127.0.0.1:9000/api");
        assert_eq!(endpoints.atcoder_users, "http://127.0.0.1:9000/users/");
    }
}
