//! HTTP error mapping and the JSON body extractor
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status
//! derived from the domain error.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            // The client may reserve instead
            DomainError::Unavailable(_) => StatusCode::BAD_REQUEST,
            DomainError::AlreadyReturned => StatusCode::BAD_REQUEST,
            DomainError::Database(_) | DomainError::Internal(_) => {
                tracing::error!(error = %e, "Unexpected error while handling request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: e.to_string(),
        }
    }
}

// Malformed bodies are client errors, whatever axum's default status would be
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// `Json` extractor whose rejections are reported as 400 `ApiError`s
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
