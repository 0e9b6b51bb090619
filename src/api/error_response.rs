//! Mapping from domain errors to HTTP responses.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Convert a domain error into the standard `{ "error": { code, message } }`
/// response with the status mapped by [`ToHttpStatus`].
pub fn error_response(error: Error) -> Response {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    // Internal detail stays in the logs; the client sees the mapped message
    if status.is_server_error() {
        tracing::error!(error = %error, "request failed");
    }

    (status, Json(ApiError::from(error))).into_response()
}
