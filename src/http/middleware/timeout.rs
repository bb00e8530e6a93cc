//! Request deadline middleware.

use std::time::Duration;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::routing::{Middleware, Next};

/// Cancel the rest of the chain after `duration` and answer 504 Gateway Timeout.
pub fn timeout(duration: Duration) -> Middleware {
    Middleware::from_fn(move |req: Request, next: Next| async move {
        let path = req.uri().path().to_string();
        match tokio::time::timeout(duration, next.run(req)).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!(path = %path, timeout = ?duration, "Request timed out");
                StatusCode::GATEWAY_TIMEOUT.into_response()
            }
        }
    })
}
