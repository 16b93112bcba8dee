// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::{catalog, FixtureSource, ORIGIN};
use anime_relay::api::{create_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

fn app(source: FixtureSource) -> Router {
    create_router(AppState::new(catalog(source)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let source = FixtureSource::new();
    let log = source.call_log();

    let (status, json) = get(app(source), "/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "invalid_request");
    assert!(json["error"].as_str().unwrap().contains("'q'"));
    assert_eq!(log.calls(), 0);
}

#[tokio::test]
async fn test_search_blank_query_is_bad_request() {
    let (status, json) = get(app(FixtureSource::new()), "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "invalid_request");
}

#[tokio::test]
async fn test_detail_without_seasons_is_not_found() {
    let source = FixtureSource::new().page(
        &format!("{}/movies/your-name/", ORIGIN),
        "<html><body><h1>Your Name</h1></body></html>",
    );

    let (status, json) = get(app(source), "/detail/movies/your-name/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["errorType"], "not_found");
    assert_eq!(json["error"], "No season buttons found");
}

#[tokio::test]
async fn test_upstream_status_is_bad_gateway() {
    let source = FixtureSource::new().failing(&format!("{}/", ORIGIN), 503);

    let (status, json) = get(app(source), "/home").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["errorType"], "upstream_error");
    assert!(json["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_upstream_timeout_is_gateway_timeout() {
    let source = FixtureSource::new().timing_out(&format!("{}/episode/slow-1x1", ORIGIN));

    let (status, json) = get(app(source), "/stream/slow-1x1").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["errorType"], "upstream_timeout");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = get(app(FixtureSource::new()), "/v1/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_on_foreign_host_is_bad_request() {
    let source = FixtureSource::new();
    let log = source.call_log();

    let (status, json) = get(app(source), "/detail/https://evil.test/series/x/").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "invalid_request");
    assert_eq!(log.calls(), 0);
}
