//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`tf_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: tf_core::Error,
    run_id: Option<String>,
}

impl AppError {
    pub fn new(inner: tf_core::Error) -> Self {
        Self {
            inner,
            run_id: None,
        }
    }

    pub fn with_run_id(mut self, id: String) -> Self {
        self.run_id = Some(id);
        self
    }
}

impl From<tf_core::Error> for AppError {
    fn from(e: tf_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
            "run_id": self.run_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
