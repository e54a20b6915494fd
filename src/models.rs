// Core data structures for cptracker

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contests longer than this (15 days, in minutes) are not time-boxed events
pub const MAX_CONTEST_DURATION_MINUTES: i64 = 15 * 24 * 60;

/// Competitive programming platform acting as a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Codeforces,
    LeetCode,
    CodeChef,
    AtCoder,
    GeeksforGeeks,
    CodingNinjas,
}

impl Platform {
    /// Every known platform, in adapter invocation order
    pub const ALL: [Platform; 6] = [
        Self::Codeforces,
        Self::LeetCode,
        Self::CodeChef,
        Self::AtCoder,
        Self::GeeksforGeeks,
        Self::CodingNinjas,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Codeforces => "Codeforces",
            Self::LeetCode => "LeetCode",
            Self::CodeChef => "CodeChef",
            Self::AtCoder => "AtCoder",
            Self::GeeksforGeeks => "GeeksforGeeks",
            Self::CodingNinjas => "CodingNinjas",
        }
    }

    /// Resolve an exact platform name as used in `platforms` queries
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Resolve a lowercase URL path segment such as `codeforces`
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(slug))
    }

    /// Title used when the upstream omits a contest name
    pub fn default_contest_name(&self) -> &'static str {
        match self {
            Self::Codeforces => "Codeforces Contest",
            Self::LeetCode => "LeetCode Contest",
            Self::CodeChef => "CodeChef Contest",
            Self::AtCoder => "AtCoder Contest",
            Self::GeeksforGeeks => "GeeksforGeeks Contest",
            Self::CodingNinjas => "CodingNinjas Contest",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown platform: {s}"))
    }
}

/// Names of all known platforms, the default `platforms` selection
pub fn default_platform_names() -> Vec<String> {
    Platform::ALL.iter().map(|p| p.as_str().to_string()).collect()
}

/// Unified contest record produced by every source adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    pub platform: Platform,
    pub name: String,
    /// UTC epoch seconds
    pub start_time: i64,
    /// UTC epoch seconds, never before `start_time`
    pub end_time: i64,
    /// Minutes
    pub duration: i64,
    pub url: String,
}

impl ContestRecord {
    /// Build a record from a start time and a duration in seconds
    ///
    /// `duration` is the floor of the seconds in minutes; `end_time` keeps
    /// second precision.
    pub fn from_seconds(
        platform: Platform,
        name: impl Into<String>,
        url: impl Into<String>,
        start_time: i64,
        duration_secs: i64,
    ) -> Self {
        let duration_secs = duration_secs.max(0);
        Self {
            platform,
            name: name.into(),
            start_time,
            end_time: start_time.saturating_add(duration_secs),
            duration: crate::utils::time::seconds_to_minutes(duration_secs),
            url: url.into(),
        }
    }

    /// Build a record from a start time and a duration in minutes
    pub fn from_minutes(
        platform: Platform,
        name: impl Into<String>,
        url: impl Into<String>,
        start_time: i64,
        duration_minutes: i64,
    ) -> Self {
        let duration_minutes = duration_minutes.max(0);
        Self {
            platform,
            name: name.into(),
            start_time,
            end_time: start_time.saturating_add(duration_minutes.saturating_mul(60)),
            duration: duration_minutes,
            url: url.into(),
        }
    }

    /// Whether the contest is short enough to show as an upcoming event
    pub fn is_time_boxed(&self) -> bool {
        self.duration <= MAX_CONTEST_DURATION_MINUTES
    }
}

/// Body of `GET /contest/upcoming`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingContests {
    pub platforms: Vec<String>,
    pub upcoming_contests: Vec<ContestRecord>,
    pub cached: bool,
}

/// A single accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedSubmission {
    pub problem_name: String,
    pub problem_id: String,
    /// UTC epoch seconds
    pub timestamp: i64,
}

/// Accepted submissions a user made today on one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub platform: Platform,
    pub username: String,
    pub today_count: usize,
    pub recent_accepted: Vec<AcceptedSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Accepted-count for one difficulty bucket (LeetCode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    #[serde(default)]
    pub count: u64,
}

/// Lifetime solved count for a user on one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedStats {
    pub platform: Platform,
    pub username: String,
    pub total_solved: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_submissions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<DifficultyCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SolvedStats {
    /// Stats with only a solved count
    pub fn new(platform: Platform, username: impl Into<String>, total_solved: u64) -> Self {
        Self {
            platform,
            username: username.into(),
            total_solved,
            total_submissions: None,
            breakdown: None,
            note: None,
        }
    }

    /// Zero-count stats explaining why nothing could be read
    pub fn unavailable(platform: Platform, username: impl Into<String>) -> Self {
        Self {
            note: Some(format!("Unable to fetch {platform} stats")),
            ..Self::new(platform, username, 0)
        }
    }
}
