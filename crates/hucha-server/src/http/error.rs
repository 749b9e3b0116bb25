//! Wire error contract
//!
//! Every failed request answers with the same JSON shape:
//!
//! ```json
//! { "timestamp": "...", "status": 400, "error": "Bad Request",
//!   "message": "...", "path": "/api/expenses" }
//! ```
//!
//! Validation failures additionally carry an `errors` map keyed by field.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use hucha_core::Error;

/// A domain error bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    path: String,
}

impl ApiError {
    pub fn new(error: Error, path: &str) -> Self {
        Self {
            error,
            path: path.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match &self.error {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::ExpenseNotFound(_) | Error::ProductNotFound(_) | Error::SkuNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::DuplicateSku(_) | Error::InsufficientStock { .. } => StatusCode::CONFLICT,
            Error::Database(_) | Error::Parse(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full but answered generically.
        let message = if status.is_server_error() {
            tracing::error!(error = %self.error, path = %self.path, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({
            "timestamp": Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
            "path": self.path,
        });
        if let Error::Validation(diagnostics) = &self.error {
            body["errors"] = json!(diagnostics.fields());
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: Error) -> StatusCode {
        ApiError::new(error, "/test").status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_of(Error::validation("amount", "must be greater than 0")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::ExpenseNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::SkuNotFound("PRD-0001".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::DuplicateSku("PRD-0001".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(Error::InsufficientStock {
                current: 1,
                requested: 2
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(Error::Parse("bad row".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
