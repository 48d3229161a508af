//! Mapping of dashboard errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::DashboardError;
use crate::goals::ProgressError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// 400 naming the first offending field
    BadRequest { field: String, message: String },
    NotFound(String),
    /// 500; the detail is logged, never sent
    Internal(String),
}

impl ApiError {
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Validation { field, message } => ApiError::BadRequest { field, message },
            DashboardError::Progress(e @ ProgressError::OutOfRange { .. }) => {
                ApiError::bad_request("index", e.to_string())
            }
            e @ DashboardError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            e @ (DashboardError::Integrity(_)
            | DashboardError::Database(_)
            | DashboardError::Serialization(_)) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest { field, message } => {
                tracing::debug!(field = %field, "Rejected request: {}", message);
                json!({ "error": { "field": field, "message": message } })
            }
            ApiError::NotFound(message) => {
                tracing::debug!("{}", message);
                json!({ "error": { "message": message } })
            }
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                json!({ "error": { "message": "Internal server error" } })
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
