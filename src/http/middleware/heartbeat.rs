//! Liveness endpoint middleware.
//!
//! Answers `GET`/`HEAD` on a fixed path (e.g. `/ping`) without calling the
//! rest of the chain. Like all router middleware it only runs for matched
//! routes, so a route must exist at that path under the same router.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;

use crate::routing::{Middleware, Next};

/// Respond `200 "."` to `GET`/`HEAD` requests for `endpoint` (ASCII case-insensitive).
pub fn heartbeat(endpoint: impl Into<String>) -> Middleware {
    let endpoint: Arc<str> = Arc::from(endpoint.into());

    Middleware::from_fn(move |req: Request, next: Next| {
        let hit = (req.method() == Method::GET || req.method() == Method::HEAD)
            && req.uri().path().eq_ignore_ascii_case(&endpoint);

        async move {
            if hit {
                return (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], ".").into_response();
            }
            next.run(req).await
        }
    })
}
