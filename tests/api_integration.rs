//! Integration tests for the management API endpoints.
//!
//! These run the real router against in-memory SQLite storage and the
//! in-process cache, exercising shorten and analytics end-to-end.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use tern::api;
use tern::cache::{LinkCache, MokaLinkCache};
use tern::models::NewClick;
use tern::service::{AnalyticsService, ResolverService};
use tern::storage::{ClickStore, SqliteStore};

struct TestApp {
    router: axum::Router,
    store: Arc<SqliteStore>,
    resolver: Arc<ResolverService>,
}

async fn create_test_app() -> TestApp {
    let store = Arc::new(SqliteStore::new("sqlite::memory:", 5).await.unwrap());
    store.init().await.unwrap();

    let cache: Arc<dyn LinkCache> = Arc::new(MokaLinkCache::new(1000));
    let resolver = Arc::new(ResolverService::new(
        store.clone(),
        cache,
        Duration::from_secs(60),
    ));
    let analytics = Arc::new(AnalyticsService::new(store.clone(), store.clone(), 100));

    let router = api::create_api_router(
        resolver.clone(),
        analytics,
        "http://localhost:3000".to_string(),
    );

    TestApp {
        router,
        store,
        resolver,
    }
}

fn shorten_request(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_shorten_creates_link() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(shorten_request("https://example.com/page"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;

    assert_eq!(body["original_url"], "https://example.com/page");
    let code = body["short_code"].as_str().unwrap();
    assert!(!code.is_empty());
    assert_eq!(
        body["short_url"].as_str().unwrap(),
        format!("http://localhost:3000/{}", code)
    );
}

#[tokio::test]
async fn test_shorten_duplicate_url_conflicts() {
    let app = create_test_app().await;

    let first = app
        .router
        .clone()
        .oneshot(shorten_request("https://example.com"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .router
        .clone()
        .oneshot(shorten_request("https://example.com"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = read_json(second).await;
    assert!(body["error"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn test_shorten_rejects_empty_url() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(shorten_request(""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_unknown_code_is_404() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/api/v1/analytics/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_reports_recorded_clicks() {
    let app = create_test_app().await;

    let link = app
        .resolver
        .create_short_url("https://example.com")
        .await
        .unwrap();

    for i in 0..3 {
        app.store
            .create(&NewClick {
                link_id: link.id,
                user_agent: Some(format!("agent-{}", i % 2)),
                ip_address: Some("127.0.0.1".to_string()),
            })
            .await
            .unwrap();
    }

    let request = Request::builder()
        .uri(format!("/api/v1/analytics/{}", link.short_code))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(
        body["short_url"].as_str().unwrap(),
        format!("http://localhost:3000/{}", link.short_code)
    );
    assert_eq!(body["original_url"], "https://example.com");
    assert_eq!(body["total_clicks"], 3);
    assert_eq!(body["recent_clicks"].as_array().unwrap().len(), 3);

    let by_ua = body["clicks_by_user_agent"].as_array().unwrap();
    assert_eq!(by_ua.len(), 2);
    assert_eq!(by_ua[0]["value"], 2);

    let by_day = body["clicks_by_day"].as_array().unwrap();
    assert_eq!(by_day.len(), 1);
    assert_eq!(by_day[0]["value"], 3);
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "OK");
}
