// tests/api_http.rs
//
// HTTP-level tests for the read API Router without opening sockets.
// The router is exercised directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value as Json;
use tower::ServiceExt as _;

use sentipulse::api::{self, AppState};
use sentipulse::record::{NewRecord, Sentiment};
use sentipulse::store::{Store, StoreConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn store_config(dir: &tempfile::TempDir) -> StoreConfig {
    StoreConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("posts.db").display()),
        fallback_path: dir.path().join("fallback.csv"),
    }
}

fn degraded_config(dir: &tempfile::TempDir) -> StoreConfig {
    StoreConfig {
        // Parent directory does not exist, so the probe fails.
        database_url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("missing/sub/posts.db").display()
        ),
        fallback_path: dir.path().join("fallback.csv"),
    }
}

fn new_record(id: &str, sentiment: Sentiment) -> NewRecord {
    NewRecord {
        source_id: id.to_string(),
        raw_text: format!("post {id}"),
        normalized_text: format!("post {id}"),
        sentiment,
        confidence: 0.9,
        posted_at: Some(Utc::now()),
        language: Some("en".to_string()),
        geo: None,
    }
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("parse json body");
    (status, v)
}

#[tokio::test]
async fn stats_on_empty_store_is_all_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::connect(&store_config(&dir)).await.unwrap());
    let app = api::router(AppState { store });

    let (status, v) = get_json(app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v,
        serde_json::json!({"total": 0, "positive": 0, "neutral": 0, "negative": 0})
    );
}

#[tokio::test]
async fn stats_counts_per_label() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::connect(&store_config(&dir)).await.unwrap();
    store.insert(new_record("1", Sentiment::Positive)).await.unwrap();
    store.insert(new_record("2", Sentiment::Positive)).await.unwrap();
    store.insert(new_record("3", Sentiment::Negative)).await.unwrap();

    let app = api::router(AppState {
        store: Arc::new(store),
    });
    let (status, v) = get_json(app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v,
        serde_json::json!({"total": 3, "positive": 2, "neutral": 0, "negative": 1})
    );
}

#[tokio::test]
async fn tweets_filters_by_sentiment_and_limits() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::connect(&store_config(&dir)).await.unwrap();
    for i in 0..5 {
        let label = if i % 2 == 0 {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        };
        store.insert(new_record(&i.to_string(), label)).await.unwrap();
    }
    let app = api::router(AppState {
        store: Arc::new(store),
    });

    let (status, v) = get_json(app.clone(), "/tweets?sentiment=Positive").await;
    assert_eq!(status, StatusCode::OK);
    let rows = v.as_array().expect("array response");
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row["sentiment"], "Positive");
        // ids and timestamps serialize as plain strings
        assert!(row["source_id"].is_string());
        assert!(row["ingested_at"].is_string());
    }

    let (status, v) = get_json(app, "/tweets?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_sentiment_label_matches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::connect(&store_config(&dir)).await.unwrap();
    store.insert(new_record("1", Sentiment::Positive)).await.unwrap();
    let app = api::router(AppState {
        store: Arc::new(store),
    });

    let (status, v) = get_json(app, "/tweets?sentiment=Euphoric").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn degraded_store_yields_503_on_both_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::connect(&degraded_config(&dir)).await.unwrap());
    assert!(!store.connected());
    let app = api::router(AppState { store });

    for uri in ["/stats", "/tweets"] {
        let (status, v) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "for {uri}");
        assert_eq!(v, serde_json::json!({"error": "DB not connected"}));
    }
}
