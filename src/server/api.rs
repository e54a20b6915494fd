//! REST API handlers
//!
//! Response shapes match what existing CP Tracker clients expect: contest
//! lists use `upcoming_contests`, per-user payloads are camelCase.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::CacheStatus;
use crate::metrics;
use crate::models::{ContestRecord, Platform};
use crate::service::parse_platforms;
use crate::error::{CptrackerErrorTrait, Error, ErrorCategory};

use super::app::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Body of a failed upcoming-contests request
#[derive(Debug, Serialize)]
pub struct UpcomingErrorResponse {
    pub platforms: Vec<String>,
    pub upcoming_contests: Vec<ContestRecord>,
    pub error: String,
}

/// Simple error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_solved: Option<u64>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            total_solved: None,
        }
    }

    /// Stats errors also carry a zero solved count
    pub fn with_zero_solved(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            total_solved: Some(0),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    /// Upcoming-contests cache at the time of the check
    pub cache: CacheStatus,
}

/// Query string of `/contest/upcoming`
#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    /// URL-encoded JSON array of platform names
    pub platforms: Option<String>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/contest/upcoming", get(upcoming_contests))
        .route("/api/submissions/{platform}/{username}", get(user_submissions))
        .route("/api/stats/{platform}/{username}", get(user_stats))
        .with_state(state)
}

fn finish(endpoint: &str, status: StatusCode, body: impl Serialize) -> Response {
    metrics::record_api_request(endpoint, status.as_u16());
    (status, Json(body)).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// API index
async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "CP Tracker Contest API",
        "endpoints": {
            "/contest/upcoming": "Get upcoming contests",
            "/api/submissions/codeforces/:username": "Get Codeforces submissions",
            "/api/submissions/leetcode/:username": "Get LeetCode submissions",
            "/api/submissions/codechef/:username": "Get CodeChef submissions",
            "/api/submissions/atcoder/:username": "Get AtCoder submissions",
            "/api/stats/codeforces/:username": "Get Codeforces total stats",
            "/api/stats/leetcode/:username": "Get LeetCode total stats",
            "/api/stats/atcoder/:username": "Get AtCoder total stats",
            "/api/stats/codechef/:username": "Get CodeChef total stats",
            "/health": "Health check",
            "/metrics": "Prometheus metrics"
        }
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    Json(HealthResponse {
        status: String::from("ok"),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache: state.contests.cache_status(now).await,
    })
}

/// Prometheus text exposition
async fn metrics_endpoint() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Aggregated upcoming contests
async fn upcoming_contests(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Response {
    const ENDPOINT: &str = "/contest/upcoming";

    let platforms = parse_platforms(query.platforms.as_deref());

    match state.contests.upcoming(platforms, Utc::now()).await {
        Ok(body) => finish(ENDPOINT, StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Upcoming contests request failed");
            finish(
                ENDPOINT,
                StatusCode::INTERNAL_SERVER_ERROR,
                UpcomingErrorResponse {
                    platforms: Vec::new(),
                    upcoming_contests: Vec::new(),
                    error: String::from("Failed to fetch contests"),
                },
            )
        }
    }
}

/// Today's accepted submissions
async fn user_submissions(
    State(state): State<AppState>,
    Path((platform, username)): Path<(String, String)>,
) -> Response {
    const ENDPOINT: &str = "/api/submissions";

    let Some(platform) = Platform::from_slug(&platform) else {
        return unsupported(ENDPOINT, &platform);
    };

    match state.stats.submissions(platform, &username, Utc::now()).await {
        Ok(summary) => finish(ENDPOINT, StatusCode::OK, summary),
        Err(e) => {
            let (status, message) = classify(platform, &username, e.into(), "Failed to fetch submissions");
            finish(ENDPOINT, status, ErrorResponse::new(message))
        }
    }
}

/// Lifetime solved count
async fn user_stats(
    State(state): State<AppState>,
    Path((platform, username)): Path<(String, String)>,
) -> Response {
    const ENDPOINT: &str = "/api/stats";

    let Some(platform) = Platform::from_slug(&platform) else {
        return unsupported(ENDPOINT, &platform);
    };

    match state.stats.stats(platform, &username).await {
        Ok(stats) => finish(ENDPOINT, StatusCode::OK, stats),
        Err(e) => {
            let (status, message) = classify(platform, &username, e.into(), "Failed to fetch stats");
            let body = if status == StatusCode::NOT_FOUND {
                ErrorResponse::new(message)
            } else {
                ErrorResponse::with_zero_solved(message)
            };
            finish(ENDPOINT, status, body)
        }
    }
}

/// Status and client-facing message for a failed per-user lookup
///
/// Upstream failures are logged in full; the client only sees `fallback`.
fn classify(platform: Platform, username: &str, err: Error, fallback: &str) -> (StatusCode, String) {
    match err.category() {
        ErrorCategory::InvalidInput => (
            StatusCode::BAD_REQUEST,
            invalid_user_message(platform).to_string(),
        ),
        ErrorCategory::NotFound => (
            StatusCode::NOT_FOUND,
            format!("Unsupported platform: {platform}"),
        ),
        category => {
            tracing::error!(
                platform = %platform,
                username,
                category = category.as_str(),
                recoverable = err.is_recoverable(),
                error = %err,
                "Per-user lookup failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, fallback.to_string())
        }
    }
}

fn invalid_user_message(platform: Platform) -> &'static str {
    match platform {
        Platform::Codeforces => "Invalid username or API error",
        _ => "Invalid username",
    }
}

fn unsupported(endpoint: &str, platform: &str) -> Response {
    finish(
        endpoint,
        StatusCode::NOT_FOUND,
        ErrorResponse::new(format!("Unsupported platform: {platform}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{FetchError, StatsError};

    #[test]
    fn test_error_response_shapes() {
        let value = serde_json::to_value(ErrorResponse::new("Failed to fetch submissions")).unwrap();
        assert_eq!(value, json!({"error": "Failed to fetch submissions"}));

        let value = serde_json::to_value(ErrorResponse::with_zero_solved("Failed to fetch stats")).unwrap();
        assert_eq!(value, json!({"error": "Failed to fetch stats", "totalSolved": 0}));
    }

    #[test]
    fn test_upcoming_error_shape() {
        let value = serde_json::to_value(UpcomingErrorResponse {
            platforms: Vec::new(),
            upcoming_contests: Vec::new(),
            error: String::from("Failed to fetch contests"),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"platforms": [], "upcoming_contests": [], "error": "Failed to fetch contests"})
        );
    }

    #[test]
    fn test_classify_stats_errors() {
        let (status, message) = classify(
            Platform::Codeforces,
            "ghost",
            StatsError::InvalidUser("ghost".into()).into(),
            "Failed to fetch stats",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid username or API error");

        let (status, message) = classify(
            Platform::GeeksforGeeks,
            "x",
            StatsError::UnsupportedPlatform("GeeksforGeeks".into()).into(),
            "Failed to fetch stats",
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Unsupported platform: GeeksforGeeks");

        let (status, message) = classify(
            Platform::LeetCode,
            "x",
            StatsError::Fetch(FetchError::Timeout).into(),
            "Failed to fetch submissions",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to fetch submissions");
    }

    #[test]
    fn test_invalid_user_messages() {
        assert_eq!(invalid_user_message(Platform::Codeforces), "Invalid username or API error");
        assert_eq!(invalid_user_message(Platform::LeetCode), "Invalid username");
    }
}
