// tests/api_http.rs
//
// HTTP-level tests for the timeline Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use artist_timeline::api::create_router;
use artist_timeline::error::ProviderError;
use artist_timeline::testing::{
    outlet, show, timeline_parts, ManualClock, MockArtistProvider, MockConcertProvider,
    MockFeedProvider,
};
use artist_timeline::timeline::{MemoryStore, TimelineService};
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024;
const SOOMPI_XML: &str = include_str!("fixtures/soompi_rss.xml");

async fn test_router(concerts: MockConcertProvider) -> Router {
    let feeds = Arc::new(MockFeedProvider::new());
    let soompi = outlet("Soompi");
    feeds.set_feed(&soompi.url, SOOMPI_XML).await;
    let parts = timeline_parts(
        Arc::new(concerts),
        feeds,
        vec![soompi],
        Arc::new(MockArtistProvider::returning(&["IU"])),
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap(),
        )),
    );
    create_router(Arc::new(TimelineService::open(parts).await))
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_router(MockConcertProvider::returning(vec![])).await;
    let (status, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "ok");
}

#[tokio::test]
async fn empty_timeline_before_first_cycle() {
    let app = test_router(MockConcertProvider::returning(vec![])).await;
    let (status, body) = send(&app, "GET", "/timeline").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["events"].as_array().unwrap().len(), 0);
    assert_eq!(v["is_loading"], false);
    assert_eq!(v["is_stale"], true);
    assert_eq!(v["show_full_error"], false);
    assert!(v["last_refresh"].is_null());
}

#[tokio::test]
async fn load_then_read_timeline() {
    let app = test_router(MockConcertProvider::returning(vec![show(
        "tm-1",
        "IU",
        "2024-09-21",
    )]))
    .await;

    let (status, body) = send(&app, "POST", "/timeline/load").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["outcome"], "updated");
    assert_eq!(v["timeline"]["events"].as_array().unwrap().len(), 3);

    let (_, body) = send(&app, "POST", "/timeline/load").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["outcome"], "skipped");
    assert_eq!(v["skipped"], "fresh");

    let (_, body) = send(&app, "GET", "/timeline").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    let first = &v["events"][0];
    assert_eq!(first["category"], "concerts");
    assert_eq!(first["source"]["kind"], "concert");
    assert_eq!(first["matched_artists"][0], "IU");
}

#[tokio::test]
async fn forced_refresh_reports_partial_data() {
    let app = test_router(MockConcertProvider::failing(ProviderError::Unauthorized)).await;
    let (status, body) = send(&app, "POST", "/timeline/refresh").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["outcome"], "partial");
    assert_eq!(v["timeline"]["has_partial_data"], true);
    assert_eq!(
        v["timeline"]["warning"],
        "News updates loaded • Concert events temporarily unavailable"
    );
}

#[tokio::test]
async fn delete_cache_empties_timeline() {
    let app = test_router(MockConcertProvider::returning(vec![])).await;
    send(&app, "POST", "/timeline/refresh").await;

    let (status, _) = send(&app, "DELETE", "/timeline/cache").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/timeline").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["events"].as_array().unwrap().len(), 0);
    assert_eq!(v["is_stale"], true);
}
