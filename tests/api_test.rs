//! HTTP API tests driven through the router with `oneshot`

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use cptracker::aggregator::Aggregator;
use cptracker::cache::ContestCache;
use cptracker::config::CacheScope;
use cptracker::crawler::ContestSource;
use cptracker::models::Platform;
use cptracker::server::{create_router, AppState};
use cptracker::service::ContestService;
use cptracker::stats::{StatsClient, StatsEndpoints};

use common::{as_sources, one_contest_per_platform, test_fetcher, BrokenAggregator, PanickingSource};

fn state_with(sources: Vec<Arc<dyn ContestSource>>) -> AppState {
    state_around(ContestService::new(
        Aggregator::new(sources, Duration::from_secs(5)),
        ContestCache::new(Duration::from_secs(600)),
        CacheScope::AllPlatforms,
    ))
}

fn state_around(contests: ContestService) -> AppState {
    // Nothing listens here; stats routes are covered in stats_test.rs
    let stats = StatsClient::with_endpoints(
        test_fetcher(),
        StatsEndpoints::with_base_url("http://127.0.0.1:9"),
    );
    AppState::new(contests, stats)
}

fn app() -> Router {
    create_router(state_with(as_sources(one_contest_per_platform())))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["cache"]["has_entry"], false);
}

#[tokio::test]
async fn test_health_reports_filled_cache() {
    let router = app();
    get(&router, "/contest/upcoming").await;

    let (_, body) = get(&router, "/health").await;
    assert_eq!(body["cache"]["has_entry"], true);
    assert_eq!(body["cache"]["is_fresh"], true);
    assert_eq!(body["cache"]["records"], Platform::ALL.len());
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (status, body) = get(&app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["/contest/upcoming"].is_string());
}

#[tokio::test]
async fn test_upcoming_defaults_to_all_platforms() {
    let (status, body) = get(&app(), "/contest/upcoming").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);
    assert_eq!(body["platforms"].as_array().unwrap().len(), Platform::ALL.len());

    let contests = body["upcoming_contests"].as_array().unwrap();
    assert_eq!(contests.len(), Platform::ALL.len());
    assert_eq!(contests[0]["platform"], "Codeforces");
    assert_eq!(contests[0]["startTime"], 1000);
    assert_eq!(contests[0]["endTime"], 1000 + 120 * 60);
    assert_eq!(contests[0]["duration"], 120);
}

#[tokio::test]
async fn test_upcoming_with_platform_list_then_cached() {
    let router = app();
    // platforms=["Codeforces","AtCoder"]
    let uri = "/contest/upcoming?platforms=%5B%22Codeforces%22%2C%22AtCoder%22%5D";

    let (status, body) = get(&router, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platforms"], serde_json::json!(["Codeforces", "AtCoder"]));
    assert_eq!(body["cached"], false);

    let platforms: Vec<&str> = body["upcoming_contests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["platform"].as_str().unwrap())
        .collect();
    assert_eq!(platforms, vec!["Codeforces", "AtCoder"]);

    let (_, again) = get(&router, uri).await;
    assert_eq!(again["cached"], true);
    assert_eq!(again["upcoming_contests"], body["upcoming_contests"]);
}

#[tokio::test]
async fn test_upcoming_malformed_platforms_uses_defaults() {
    let (status, body) = get(&app(), "/contest/upcoming?platforms=Codeforces").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platforms"].as_array().unwrap().len(), Platform::ALL.len());
}

#[tokio::test]
async fn test_upcoming_survives_panicking_source() {
    let mut sources = as_sources(one_contest_per_platform());
    sources[0] = Arc::new(PanickingSource(Platform::Codeforces));
    let router = create_router(state_with(sources));

    let (status, body) = get(&router, "/contest/upcoming").await;

    assert_eq!(status, StatusCode::OK);
    let contests = body["upcoming_contests"].as_array().unwrap();
    assert_eq!(contests.len(), Platform::ALL.len() - 1);
    assert!(contests.iter().all(|c| c["platform"] != "Codeforces"));
}

#[tokio::test]
async fn test_upcoming_aggregation_failure_is_server_error() {
    let router = create_router(state_around(ContestService::new(
        BrokenAggregator::new(),
        ContestCache::new(Duration::from_secs(600)),
        CacheScope::AllPlatforms,
    )));

    let (status, body) = get(&router, "/contest/upcoming").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        serde_json::json!({
            "platforms": [],
            "upcoming_contests": [],
            "error": "Failed to fetch contests"
        })
    );

    // Failures are not cached
    let (_, health) = get(&router, "/health").await;
    assert_eq!(health["cache"]["has_entry"], false);
}

#[tokio::test]
async fn test_unknown_platform_slug_is_not_found() {
    let router = app();

    let (status, body) = get(&router, "/api/submissions/topcoder/tourist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unsupported platform: topcoder");

    let (status, _) = get(&router, "/api/stats/geeksforgeeks/someone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_codechef_submissions_need_no_upstream() {
    let (status, body) = get(&app(), "/api/submissions/codechef/chef").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "CodeChef");
    assert_eq!(body["todayCount"], 0);
    assert!(body["note"].as_str().unwrap().contains("authentication"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let _ = cptracker::metrics::init_metrics();
    let router = app();

    get(&router, "/contest/upcoming").await;

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("cptracker_api_requests_total"));
}
