use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// A wrapper around `axum::Json<T>` that returns `AppError` on deserialization failure
/// instead of Axum's default plain-text rejection.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let reason = match &rejection {
                    JsonRejection::JsonDataError(_) => "JSON data deserialization failed",
                    JsonRejection::JsonSyntaxError(_) => "JSON syntax parsing failed",
                    JsonRejection::MissingJsonContentType(_) => "Missing JSON Content-Type",
                    JsonRejection::BytesRejection(_) => "Failed to read request body bytes",
                    _ => "Unexpected JSON body rejection",
                };
                tracing::warn!(error = %rejection, reason, "Rejected request body");
                Err(AppError::bad_request("INVALID_REQUEST_BODY", "请求体格式无效"))
            }
        }
    }
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: serde::Serialize> IntoResponse for JsonBody<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}
