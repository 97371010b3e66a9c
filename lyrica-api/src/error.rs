//! HTTP error mapping for lyrica-api
//!
//! Translates store errors into JSON error responses. Validation failures
//! are client errors (400), missing resources are 404, everything else is
//! a 500 with the detail kept out of the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or constraint-violating input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything the caller cannot fix
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<lyrica_common::Error> for ApiError {
    fn from(err: lyrica_common::Error) -> Self {
        use lyrica_common::Error;
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
