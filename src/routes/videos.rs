use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::constants::STREAM_BUF_BYTES;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::videos::{logical_id, upload_id, VideoEntry, VideoStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/video", post(upload_video))
        .route("/video/:video_id", get(stream_video).delete(delete_video))
        .route("/videos", get(list_videos))
}

/// Streams the stored bytes with an explicit length so clients can show
/// progress; the store serves `video/mp4` exclusively.
async fn stream_video(
    Path(video_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let video_id = logical_id(&video_id)?;
    let (file, len) = state.videos().open(&video_id).await?;

    let stream = ReaderStream::with_capacity(file, STREAM_BUF_BYTES);
    let mut response = Body::from_stream(stream).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    if let Ok(disposition) = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        VideoStore::file_name(&video_id)
    )) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    Ok(response)
}

/// Multipart upload, form field `video`. The uploaded file name supplies
/// the logical id; a same-id upload silently overwrites.
async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("video") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                AppError::bad_request("MISSING_FILENAME", "video 字段缺少文件名")
            })?;
        let video_id = upload_id(&file_name)?;

        let mut out = state.videos().writer(&video_id).await?;
        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size_bytes += chunk.len() as u64;
            out.write_all(&chunk)
                .await
                .map_err(crate::videos::VideoStoreError::Io)?;
        }
        out.flush()
            .await
            .map_err(crate::videos::VideoStoreError::Io)?;

        tracing::info!(video_id = %video_id, size_bytes, "Video stored");
        return Ok(created(VideoEntry {
            file_name: VideoStore::file_name(&video_id),
            video_id,
            size_bytes,
        }));
    }

    Err(AppError::bad_request(
        "MISSING_VIDEO_FIELD",
        "multipart 请求中缺少 video 字段",
    ))
}

async fn delete_video(
    Path(video_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let video_id = logical_id(&video_id)?;
    state.videos().delete(&video_id).await?;
    Ok(ok(serde_json::json!({ "deleted": true })))
}

async fn list_videos(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let videos = state.videos().list().await?;
    Ok(ok(videos))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    // 超出 DefaultBodyLimit 的上传在流式读取阶段失败，状态映射为 413
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::payload_too_large("上传内容超出大小限制");
    }
    tracing::warn!(error = %e, "Failed to read multipart request");
    AppError::bad_request("INVALID_MULTIPART", "multipart 请求体无效")
}
