//! HTTP mapping for the common error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reelvault_common::Error;
use serde_json::json;

/// Newtype so the common error can become an axum response.
#[derive(Debug)]
pub struct AppError(pub Error);

/// Handler result type.
pub type AppResult<T> = std::result::Result<T, AppError>;

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let code = match &self.0 {
            Error::InvalidUpload(_) => "invalid_upload",
            Error::SessionNotFound(_) => "session_not_found",
            Error::NotFound(_) => "not_found",
            Error::RangeRequired => "range_required",
            Error::InvalidRange(_) => "invalid_range",
            Error::Storage(_) => "storage_error",
            Error::Database(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        };

        let body = Json(json!({
            "error": self.0.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
