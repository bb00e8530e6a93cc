//! Response helpers.
//!
//! # Responsibilities
//! - Pair every response with an explicit status code
//! - Set the matching Content-Type
//! - Map encoding failures to 500 before any body byte is produced
//!
//! # Design Decisions
//! - Bodies are fully encoded in memory first, so a failure never
//!   yields a half-written response

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Serialize `data` as a JSON response with `status`.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Response {
    match serde_json::to_vec(data) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "JSON response encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Plain text response with `status`.
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body.into()).into_response()
}
