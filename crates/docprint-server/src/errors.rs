//! JSON error bodies and the mapping from cache failures to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docprint::CacheError;
use serde_json::json;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a cache failure to a response.
///
/// Caller faults are 422, an unreachable store is 503, and anything else is
/// an internal error whose detail stays in the log.
pub fn cache_error_response(err: CacheError) -> Response {
    if err.is_invalid_input() {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            err.to_string(),
        );
    }

    if err.is_unavailable() {
        tracing::warn!(error = %err, "artifact store unavailable");
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            "artifact store is unavailable, retry later",
        );
    }

    tracing::error!(error = %err, "document generation failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "document generation failed",
    )
}
