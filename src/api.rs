// src/api.rs
//! Read-only HTTP API over the persisted collection. The single error
//! surfaced to callers is store unavailability, as HTTP 503.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::record::PostRecord;
use crate::store::{SentimentCounts, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/tweets", get(tweets))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorResp {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResp>);

fn db_not_connected() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResp {
            error: "DB not connected".to_string(),
        }),
    )
}

fn internal(e: anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResp {
            error: e.to_string(),
        }),
    )
}

async fn stats(State(state): State<AppState>) -> Result<Json<SentimentCounts>, ApiError> {
    if !state.store.connected() {
        return Err(db_not_connected());
    }
    state.store.stats().await.map(Json).map_err(internal)
}

#[derive(Deserialize)]
struct TweetsQuery {
    sentiment: Option<String>,
    limit: Option<u32>,
}

async fn tweets(
    State(state): State<AppState>,
    Query(q): Query<TweetsQuery>,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    if !state.store.connected() {
        return Err(db_not_connected());
    }
    let limit = q.limit.unwrap_or(50);
    state
        .store
        .recent(limit, q.sentiment.as_deref())
        .await
        .map(Json)
        .map_err(internal)
}
