use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::multipart::MultipartError;

/// Every failure a route can report. Rendering happens only in
/// `into_response`, which keeps the `{ok: false, error}` shape uniform.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid_payload")]
    InvalidPayload,
    #[error("Unreadable request body: {0}")]
    Body(String),
    #[error(transparent)]
    Upload(#[from] MultipartError),
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("JSON must be an array of emails")]
    NotAnArray,
    #[error("not_found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::NotFound => tracing::debug!(target: "http", "route not found"),
            ApiError::Internal(detail) => {
                tracing::error!(target: "http", error = %detail, "request failed")
            }
            other => tracing::warn!(target: "http", error = %other, "request rejected"),
        }

        let mut body = json!({ "ok": false, "error": self.to_string() });
        if matches!(self, ApiError::InvalidPayload) {
            body["results"] = json!([]);
        }
        (self.status(), Json(body)).into_response()
    }
}
