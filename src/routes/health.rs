use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "store": {
            "healthy": true,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

pub async fn database_health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let start = Instant::now();
    let healthy = state.store().get_user_stats("__health_check__").is_ok();
    let latency_us = start.elapsed().as_micros() as u64;

    let video_dir_ok = tokio::fs::metadata(state.videos().dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    Json(serde_json::json!({
        "healthy": healthy,
        "latencyUs": latency_us,
        "videoDir": {
            "healthy": video_dir_ok,
        },
    }))
}
