use crate::media::UploadError;
use crate::state::StoreError;
use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Errors returned by every HTTP handler
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    UnsupportedMediaType(String),
    SizeLimitExceeded(String),
    RangeNotSatisfiable,
    /// Logged; clients only see a generic message
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg)
            | ApiError::Validation(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::SizeLimitExceeded(msg)
            | ApiError::Internal(msg) => f.write_str(msg),
            ApiError::RangeNotSatisfiable => f.write_str("Requested range not satisfiable"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::SizeLimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => {
                ApiError::NotFound(format!("{} not found", capitalize(entity)))
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => ApiError::Validation(err.to_string()),
            UploadError::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType(err.to_string()),
            UploadError::TooLarge { .. } => ApiError::SizeLimitExceeded(err.to_string()),
            UploadError::Io(e) => ApiError::Internal(format!("upload storage: {}", e)),
        }
    }
}

/// Malformed or mistyped JSON bodies are validation failures, not 422s
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Wrong content type or missing boundary on an upload
impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
