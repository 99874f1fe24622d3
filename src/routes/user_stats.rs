use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::constants::ALLOWED_STAT_NAMES;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::user_stats::{StatField, UserStats};
use crate::validation::validate_user_id;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_user_stats)).route(
        "/:user_id",
        get(get_user_stats)
            .post(replace_user_stats)
            .put(update_user_stat)
            .delete(delete_user_stats),
    )
}

fn checked_user_id(user_id: &str) -> Result<&str, AppError> {
    validate_user_id(user_id).map_err(|msg| AppError::bad_request("INVALID_USER_ID", msg))?;
    Ok(user_id)
}

async fn list_user_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let all = state.store().list_user_stats()?;
    Ok(ok(all))
}

/// 读取即创建：首个读取为该用户物化一条全零记录。
async fn get_user_stats(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let stats = state.store().get_or_create_user_stats(user_id)?;
    Ok(ok(stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceResponse {
    updated: bool,
    stats: Option<UserStats>,
}

/// Full replace. A missing record is not created: the response reports
/// `updated: false` and callers are expected to `GET` first.
async fn replace_user_stats(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserStats>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = checked_user_id(&user_id)?;
    if body.user_id != user_id {
        return Err(AppError::bad_request(
            "USER_ID_MISMATCH",
            "请求体中的 userId 与路径参数不一致",
        ));
    }

    let updated = state.store().replace_user_stats(&body)?;
    Ok(ok(ReplaceResponse {
        updated,
        stats: updated.then_some(body),
    }))
}

// 查询参数沿用对外契约的蛇形命名：?stat_name=&new_value=
#[derive(Debug, Deserialize)]
struct UpdateStatQuery {
    stat_name: String,
    new_value: u64,
}

async fn update_user_stat(
    Path(user_id): Path<String>,
    Query(query): Query<UpdateStatQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let Some(field) = StatField::parse(&query.stat_name) else {
        return Err(AppError::bad_request(
            "INVALID_STAT_NAME",
            &format!(
                "Invalid stat name '{}'. Allowed stat names are {ALLOWED_STAT_NAMES}",
                query.stat_name
            ),
        ));
    };

    let stats = state
        .store()
        .set_user_stat(user_id, field, query.new_value)?;
    Ok(ok(stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted: bool,
}

async fn delete_user_stats(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = checked_user_id(&user_id)?;
    state.store().delete_user_stats(user_id)?;
    Ok(ok(DeleteResponse { deleted: true }))
}
