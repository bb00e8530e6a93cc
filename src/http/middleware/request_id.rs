//! Request ID middleware.
//!
//! Propagates an upstream `X-Request-ID` (or a custom header) when present,
//! otherwise mints one, and stores it as a `RequestId` extension.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderName;

use crate::http::request::{RequestIdGenerator, X_REQUEST_ID};
use crate::routing::{Middleware, Next};

/// Attach a request ID taken from `X-Request-ID` or minted by `generator`.
pub fn request_id(generator: Arc<RequestIdGenerator>) -> Middleware {
    request_id_from_header(generator, HeaderName::from_static(X_REQUEST_ID))
}

/// Like [`request_id`], reading the upstream ID from `header`.
pub fn request_id_from_header(generator: Arc<RequestIdGenerator>, header: HeaderName) -> Middleware {
    Middleware::from_fn(move |mut req: Request, next: Next| {
        let existing = req
            .headers()
            .get(&header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let id = generator.from_header_or_new(existing);
        req.extensions_mut().insert(id);
        next.run(req)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestIdExt;
    use crate::routing::{compose, Handler};
    use axum::body::Body;

    fn echo_id() -> Handler {
        Handler::new(|req: Request| async move { req.request_id().to_string() })
    }

    async fn body_of(handler: &Handler, req: Request) -> String {
        let res = handler.call(req).await;
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_id_propagated() {
        let generator = Arc::new(RequestIdGenerator::with_prefix("p"));
        let handler = compose(&[request_id(generator)], &[], echo_id());

        let req = Request::builder()
            .header("X-Request-ID", "upstream-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(&handler, req).await, "upstream-123");
    }

    #[tokio::test]
    async fn test_missing_id_minted() {
        let generator = Arc::new(RequestIdGenerator::with_prefix("p"));
        let handler = compose(&[request_id(generator)], &[], echo_id());

        assert_eq!(body_of(&handler, Request::new(Body::empty())).await, "p-000001");
        assert_eq!(body_of(&handler, Request::new(Body::empty())).await, "p-000002");
    }

    #[tokio::test]
    async fn test_custom_header() {
        let generator = Arc::new(RequestIdGenerator::with_prefix("p"));
        let mw = request_id_from_header(generator, HeaderName::from_static("x-trace"));
        let handler = compose(&[mw], &[], echo_id());

        let req = Request::builder()
            .header("X-Trace", "t-1")
            .header("X-Request-ID", "ignored")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(&handler, req).await, "t-1");
    }
}
