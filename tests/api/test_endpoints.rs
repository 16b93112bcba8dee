// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Router tests for the relay endpoints
//!
//! Every test drives the real axum router with `oneshot` against an
//! in-process upstream fixture.

use crate::common::{
    catalog, season_fragment, season_url, FixtureSource, DETAIL_HTML, HOME_HTML, ORIGIN,
    SEARCH_NARUTO_HTML,
};
use anime_relay::api::{create_router, AppState};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

fn app(source: FixtureSource) -> Router {
    create_router(AppState::new(catalog(source)))
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

#[tokio::test]
async fn test_search_endpoint_naruto() {
    let source = FixtureSource::new().page(&format!("{}/?s=naruto", ORIGIN), SEARCH_NARUTO_HTML);

    let (status, json) = get(app(source), "/search?q=naruto").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["results"][0]["title"], "Naruto");
    assert_eq!(json["results"][0]["link"], "/series/naruto/");
    assert_eq!(json["results"][0]["image"], "https://img.test/naruto.jpg");
    assert_eq!(json["results"][0]["categories"], "action, shounen");
    assert_eq!(json["results"][1]["title"], "Naruto Shippuden");
    assert_eq!(json["results"][1]["link"], "/series/naruto-shippuden/");
}

#[tokio::test]
async fn test_home_endpoint_is_object_of_sections() {
    let source = FixtureSource::new().page(&format!("{}/", ORIGIN), HOME_HTML);

    let (status, json) = get(app(source), "/home").await;

    assert_eq!(status, StatusCode::OK);
    let sections = json.as_object().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(json["Most-Watched Series"][0]["title"], "Naruto");
    assert_eq!(json["Fresh Drops"][0]["episodes"], "EP 1000");
}

#[tokio::test]
async fn test_detail_endpoint() {
    let source = FixtureSource::new()
        .page(&format!("{}/series/naruto-shippuden/", ORIGIN), DETAIL_HTML)
        .page(&season_url(1), &season_fragment(1, 2))
        .page(&season_url(2), &season_fragment(2, 1))
        .page(&season_url(3), &season_fragment(3, 1));

    let (status, json) = get(app(source), "/detail/series/naruto-shippuden/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Naruto Shippuden");
    assert_eq!(json["url"], "series/naruto-shippuden/");
    assert_eq!(json["imageUrl"], "https://img.test/poster.jpg");
    assert_eq!(json["languages"], serde_json::json!(["Hindi", "English"]));
    assert_eq!(json["totalEpisodes"], 4);
    assert_eq!(json["episodes"][0]["number"], "1x1");
    assert_eq!(json["episodes"][0]["url"], "/episode/naruto-shippuden-1x1/");
    assert_eq!(json["episodes"][0]["imageUrl"], "N/A");
}

#[tokio::test]
async fn test_stream_endpoint() {
    let source = FixtureSource::new().page(
        &format!("{}/episode/naruto-1x1", ORIGIN),
        r#"<iframe src="https://embed.test/1"></iframe>
           <script>var a = "https://cdn.test/a.m3u8", b = "https://cdn.test/b.mp4";</script>"#,
    );

    let (status, json) = get(app(source), "/stream/naruto-1x1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["requestedPath"], "naruto-1x1");
    assert_eq!(json["m3u8Links"], serde_json::json!(["https://cdn.test/a.m3u8"]));
    assert_eq!(json["videoLinks"], serde_json::json!(["https://cdn.test/b.mp4"]));
    assert_eq!(json["iframes"], serde_json::json!(["https://embed.test/1"]));
    assert_eq!(json["totalStreams"], 3);
}

#[tokio::test]
async fn test_cache_clear_endpoint() {
    let source = FixtureSource::new().page(&format!("{}/?s=naruto", ORIGIN), SEARCH_NARUTO_HTML);
    let log = source.call_log();
    let app = app(source);

    get(app.clone(), "/search?q=naruto").await;
    let (_, health) = get(app.clone(), "/health").await;
    assert_eq!(health["cacheSize"], 2);

    let (status, json) = send(app.clone(), Method::POST, "/cache/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "cleared");

    let (_, health) = get(app.clone(), "/health").await;
    assert_eq!(health["cacheSize"], 0);

    get(app, "/search?q=naruto").await;
    assert_eq!(log.calls(), 2);
}

#[tokio::test]
async fn test_cache_clear_requires_post() {
    let (status, _) = get(app(FixtureSource::new()), "/cache/clear").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get(app(FixtureSource::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].as_f64().unwrap() > 1_600_000_000.0);
    assert_eq!(json["cacheSize"], 0);
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_index_endpoint_lists_routes() {
    let (status, json) = get(app(FixtureSource::new()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "anime-relay");
    assert_eq!(json["origin"], ORIGIN);
    let features = json["features"].as_array().unwrap();
    assert!(features.iter().any(|f| f == "ttl-cache"));
    let paths: Vec<_> = json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/home"));
    assert!(paths.contains(&"/cache/clear"));
}
