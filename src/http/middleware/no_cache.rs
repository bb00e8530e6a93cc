//! Cache-busting middleware.
//!
//! Sets, as nginx's proxy module expects:
//! ```text
//! Expires: Thu, 01 Jan 1970 00:00:00 UTC
//! Cache-Control: no-cache, no-store, no-transform, must-revalidate, private, max-age=0
//! Pragma: no-cache
//! X-Accel-Expires: 0
//! ```

use axum::extract::Request;
use axum::http::header::{
    HeaderName, HeaderValue, CACHE_CONTROL, ETAG, EXPIRES, IF_MATCH, IF_MODIFIED_SINCE,
    IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE, PRAGMA,
};

use crate::routing::{Middleware, Next};

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 UTC";

const NO_CACHE_CONTROL: &str =
    "no-cache, no-store, no-transform, must-revalidate, private, max-age=0";

const X_ACCEL_EXPIRES: &str = "x-accel-expires";

/// Request headers that would let a conditional request hit a cache.
const ETAG_HEADERS: [HeaderName; 6] = [
    ETAG,
    IF_MODIFIED_SINCE,
    IF_MATCH,
    IF_NONE_MATCH,
    IF_RANGE,
    IF_UNMODIFIED_SINCE,
];

/// Prevent upstream proxies and clients from caching responses.
pub fn no_cache() -> Middleware {
    Middleware::from_fn(|mut req: Request, next: Next| async move {
        for name in ETAG_HEADERS {
            req.headers_mut().remove(name);
        }

        let mut res = next.run(req).await;

        let headers = res.headers_mut();
        headers.insert(EXPIRES, HeaderValue::from_static(EPOCH));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_CONTROL));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(HeaderName::from_static(X_ACCEL_EXPIRES), HeaderValue::from_static("0"));
        res
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{compose, Handler};
    use axum::body::Body;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_headers_set_and_conditionals_stripped() {
        let handler = Handler::new(|req: Request| async move {
            if req.headers().contains_key(IF_NONE_MATCH) {
                StatusCode::NOT_MODIFIED
            } else {
                StatusCode::OK
            }
        });
        let handler = compose(&[no_cache()], &[], handler);

        let req = Request::builder()
            .header("If-None-Match", "\"abc\"")
            .body(Body::empty())
            .unwrap();
        let res = handler.call(req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[EXPIRES], EPOCH);
        assert_eq!(res.headers()[CACHE_CONTROL], NO_CACHE_CONTROL);
        assert_eq!(res.headers()[PRAGMA], "no-cache");
        assert_eq!(res.headers()[X_ACCEL_EXPIRES], "0");
    }
}
