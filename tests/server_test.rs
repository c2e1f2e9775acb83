//! Router tests driven through `tower::ServiceExt::oneshot`.

#![cfg(feature = "server")]

mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{APP_ID, BASE_URL, FakeTransport, document, page, url_for};
use playbadge::{Badge, BadgeService};
use playbadge::server::{AppState, router};

fn app(transport: Arc<FakeTransport>) -> (axum::Router, Arc<BadgeService>) {
    let service = Arc::new(
        BadgeService::builder()
            .store_url(BASE_URL)
            .transport(transport)
            .build()
            .unwrap(),
    );
    let state = AppState::new(Arc::clone(&service), 10_000);
    (router(state), service)
}

fn serving_app() -> Arc<FakeTransport> {
    Arc::new(FakeTransport::new().page(url_for(APP_ID), page(&document(APP_ID))))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, cache_control, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn play_renders_badge() {
    let (app, _) = app(serving_app());

    let (status, cache_control, body) =
        get(&app, "/play?i=org.example.app&l=Android&m=%24version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("max-age=10000"));
    assert_eq!(
        body,
        json!({
            "schemaVersion": 1,
            "label": "Android",
            "message": "2.3.1",
            "cacheSeconds": 3600
        })
    );
}

#[tokio::test]
async fn play_body_is_a_badge() {
    let (app, _) = app(serving_app());
    let (_, _, body) = get(&app, "/play?i=org.example.app&m=%24name").await;
    let badge: Badge = serde_json::from_value(body).unwrap();
    assert_eq!(badge, Badge::new("play", "Example App"));

    let (_, _, body) = get(&app, "/play?i=bad").await;
    let badge: Badge = serde_json::from_value(body).unwrap();
    assert_eq!(badge, Badge::error("invalid app id format"));
}

#[tokio::test]
async fn play_accepts_long_parameter_names() {
    let (app, _) = app(serving_app());
    let (_, _, body) = get(&app, "/play?id=org.example.app&label=$name&message=$installs").await;
    assert_eq!(body["label"], "Example App");
    assert_eq!(body["message"], "1,000,000+");
}

#[tokio::test]
async fn play_errors_are_badges_with_status_200() {
    let transport = Arc::new(FakeTransport::new());
    let (app, _) = app(Arc::clone(&transport));

    let (status, cache_control, body) = get(&app, "/play").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("max-age=10000"));
    assert_eq!(
        body,
        json!({
            "schemaVersion": 1,
            "label": "error",
            "message": "missing app id",
            "isError": true
        })
    );

    let (_, _, body) = get(&app, "/play?i=org.mozilla%20firefox").await;
    assert_eq!(body["message"], "invalid app id format");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn play_caches_on_path_and_raw_query() {
    let transport = serving_app();
    let (app, service) = app(Arc::clone(&transport));

    get(&app, "/play?i=org.example.app").await;
    get(&app, "/play?i=org.example.app").await;
    get(&app, "/play?id=org.example.app").await;

    assert_eq!(
        service.caches().badges.keys(),
        vec![
            "/playid=org.example.app".to_string(),
            "/playi=org.example.app".to_string()
        ]
    );
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn stats_counts_tiers() {
    let (app, _) = app(serving_app());
    get(&app, "/play?i=org.example.app").await;

    let (status, _, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "schemaVersion": 1,
            "label": "Status",
            "message": "1 apps with 1 badges",
            "cacheSeconds": 60
        })
    );
}

#[tokio::test]
async fn placeholders_lists_descriptions() {
    let (app, _) = app(Arc::new(FakeTransport::new()));
    let (_, _, body) = get(&app, "/placeholders").await;
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 15);
    assert_eq!(map["$minsdk"], "Required min. SDK");
}

#[tokio::test]
async fn health_reports_version() {
    let (app, _) = app(Arc::new(FakeTransport::new()));
    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(
        body["version"]
            .as_str()
            .unwrap()
            .starts_with(playbadge::PKG_VERSION)
    );
}
