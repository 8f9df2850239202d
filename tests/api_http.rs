// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health (healthy, unhealthy, recovery)
// - GET /api/v1/news/articles (defaults, limit/offset, store outage)
// - POST /api/v1/news/ingest (synchronous cycle + acknowledgment)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use news_aggregator::api;
use news_aggregator::cache::MemoryStore;
use news_aggregator::context::AppContext;
use news_aggregator::ingest::fetch::FeedClient;
use news_aggregator::ingest::types::FeedSource;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const WORLD_XML: &str = include_str!("fixtures/world_rss.xml");
const MARKETS_XML: &str = include_str!("fixtures/markets_rss.xml");

struct StaticFeedClient {
    bodies: HashMap<String, String>,
}

#[async_trait]
impl FeedClient for StaticFeedClient {
    async fn fetch(&self, source: &FeedSource) -> anyhow::Result<String> {
        self.bodies
            .get(&source.name)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", source.url))
    }
}

/// Build the same Router the binary uses, on top of an in-process store.
fn test_router(store: Arc<MemoryStore>) -> Router {
    let client = StaticFeedClient {
        bodies: HashMap::from([
            ("World News".to_string(), WORLD_XML.to_string()),
            ("Markets Desk".to_string(), MARKETS_XML.to_string()),
        ]),
    };
    let ctx = AppContext::with_parts(
        vec![
            FeedSource::new("World News", "https://news.example/world/rss"),
            FeedSource::new("Markets Desk", "https://news.example/markets/rss"),
        ],
        store,
        Arc::new(client),
        Duration::from_secs(3600),
    );
    api::router(ctx)
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn health_reflects_store_reachability_and_recovers() {
    let store = Arc::new(MemoryStore::new());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = test_router(store.clone()).oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["store"], "connected");

    // Force the store unreachable: degraded, not crashed.
    store.set_online(false);
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "unhealthy");
    assert_eq!(v["store"], "disconnected");

    // Back online: healthy again.
    store.set_online(true);
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn articles_endpoint_returns_empty_array_on_cold_cache() {
    let store = Arc::new(MemoryStore::new());

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/news/articles")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v, serde_json::json!([]));
}

#[tokio::test]
async fn ingest_then_list_round_trip() {
    let store = Arc::new(MemoryStore::new());

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/news/ingest")
        .body(Body::empty())
        .expect("build POST /api/v1/news/ingest");
    let resp = test_router(store.clone()).oneshot(req).await.expect("oneshot ingest");
    assert!(resp.status().is_success());
    let ack = json_body(resp).await;
    assert_eq!(ack["status"], "completed");
    assert_eq!(ack["ingested"], 4);
    assert!(ack["sources"].is_array());

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/news/articles")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    let items = v.as_array().expect("articles array");
    assert_eq!(items.len(), 4);
    // Contract checks for UI consumers
    for item in items {
        assert!(item.get("id").is_some(), "missing 'id'");
        assert!(item.get("title").is_some(), "missing 'title'");
        assert!(item.get("source").is_some(), "missing 'source'");
        assert!(item.get("published_at").is_some(), "missing 'published_at'");
        assert!(item.get("url").is_some(), "missing 'url'");
    }
}

#[tokio::test]
async fn articles_endpoint_honors_limit_and_offset() {
    let store = Arc::new(MemoryStore::new());

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/news/ingest")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store.clone()).oneshot(req).await.unwrap();
    assert!(resp.status().is_success());

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/news/articles?limit=2&offset=0")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store.clone()).oneshot(req).await.unwrap();
    let v = json_body(resp).await;
    assert_eq!(v.as_array().unwrap().len(), 2);

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/news/articles?limit=10&offset=100")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store).oneshot(req).await.unwrap();
    let v = json_body(resp).await;
    assert!(v.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn articles_endpoint_store_outage_is_503_with_error_body() {
    let store = Arc::new(MemoryStore::new());
    store.set_online(false);

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/news/articles")
        .body(Body::empty())
        .unwrap();
    let resp = test_router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = json_body(resp).await;
    assert!(v.get("error").is_some(), "outage must carry an error body");
}
