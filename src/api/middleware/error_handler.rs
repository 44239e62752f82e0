//! Error handler for converting AppError to HTTP responses.
//!
//! Implements `IntoResponse` for `AppError` and provides the global middleware
//! that wraps error responses produced outside the handlers (unknown routes,
//! method mismatches, timeouts) in the same envelope.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::{ApiResponse, ErrorBody};
use crate::error::AppError;

/// Upper bound when reading a non-JSON error body for its message.
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Maps a machine-readable error code to its HTTP status.
///
/// Unknown codes map to 500.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "ALREADY_EXISTS" => StatusCode::CONFLICT,
        "INVALID_INPUT" => StatusCode::BAD_REQUEST,
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        "FORBIDDEN" => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders an error body inside the envelope with the given status.
pub fn envelope_response(status: StatusCode, error: ErrorBody) -> Response {
    (status, Json(ApiResponse::failure(error))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal { message, source } => {
                tracing::error!(error = ?source, message = %message, "Internal error");
            }
            other => {
                tracing::debug!(code = other.code(), error = %other, "Request failed");
            }
        }

        envelope_response(status_for_code(self.code()), ErrorBody::from(&self))
    }
}

/// Taxonomy code and default message for error statuses produced by the
/// framework.
///
/// Rejections by the router or extractors become `INVALID_INPUT` unless the
/// table has a closer code. Timeouts and unavailability are server-side
/// failures.
fn framework_error(status: StatusCode) -> (&'static str, &'static str) {
    match status {
        StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "authentication required"),
        StatusCode::FORBIDDEN => ("FORBIDDEN", "access denied"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "resource not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("INVALID_INPUT", "method not allowed"),
        StatusCode::PAYLOAD_TOO_LARGE => ("INVALID_INPUT", "request payload too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("INVALID_INPUT", "unsupported media type"),
        StatusCode::REQUEST_TIMEOUT => ("INTERNAL_ERROR", "request timed out"),
        StatusCode::SERVICE_UNAVAILABLE => ("INTERNAL_ERROR", "service unavailable"),
        s if s.is_client_error() => ("INVALID_INPUT", "bad request"),
        _ => ("INTERNAL_ERROR", "internal server error"),
    }
}

/// Global error handling middleware.
///
/// Error responses that already carry JSON pass through untouched. Any other
/// 4xx/5xx is rewritten into the envelope, and its status is taken from
/// `status_for_code` so the wire status always matches the code. For client
/// errors the original plain-text body becomes the details; server error
/// bodies are dropped.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original_message = axum::body::to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let (code, message) = framework_error(status);
    let mut error = ErrorBody::new(code, message);
    if status.is_client_error() && !original_message.is_empty() {
        error = error.with_details(&original_message);
    }

    let mut wrapped = envelope_response(status_for_code(code), error);
    // Keep headers such as x-request-id or Allow set further in
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            wrapped.headers_mut().append(name.clone(), value.clone());
        }
    }
    wrapped
}

/// Fallback for unknown routes.
pub async fn not_found_fallback() -> Response {
    envelope_response(
        StatusCode::NOT_FOUND,
        ErrorBody::new("NOT_FOUND", "resource not found"),
    )
}
