pub mod health;
pub mod user_stats;
pub mod videos;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::state::AppState;

/// Maximum JSON request body size: 2 MiB. Video uploads get their own
/// configurable limit.
const MAX_JSON_BODY_SIZE: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let stats_routes = user_stats::router().layer(DefaultBodyLimit::max(MAX_JSON_BODY_SIZE));
    let video_routes =
        videos::router().layer(DefaultBodyLimit::max(state.config().max_upload_bytes));

    Router::new()
        .nest("/user-stats", stats_routes)
        .merge(video_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
