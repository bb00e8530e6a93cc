//! Request logging middleware.
//!
//! Emits a START event before and an END event after the rest of the chain,
//! carrying the request ID (from `request_id`, or `<nil>`), method, URI,
//! status and elapsed time.

use std::time::Instant;

use axum::extract::Request;

use crate::http::request::RequestIdExt;
use crate::routing::{Middleware, Next};

/// Log every request passing through.
pub fn logger() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let request_id = match req.request_id() {
            "" => "<nil>".to_string(),
            id => id.to_string(),
        };
        let method = req.method().clone();
        let uri = req.uri().clone();

        tracing::info!(request_id = %request_id, method = %method, uri = %uri, "START");
        let start = Instant::now();

        let res = next.run(req).await;

        tracing::info!(
            request_id = %request_id,
            status = res.status().as_u16(),
            duration = ?start.elapsed(),
            "END"
        );
        res
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestIdGenerator;
    use crate::routing::{compose, Handler};
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    fn created() -> Handler {
        Handler::new(|_req| async { (StatusCode::CREATED, "made") })
    }

    #[tokio::test]
    async fn test_logger_passes_response_through() {
        let handler = compose(&[logger()], &[], created());

        let res = handler.call(Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"made");
    }

    #[tokio::test]
    async fn test_logger_without_request_id() {
        let (captured, _guard) = capture();
        let handler = compose(&[logger()], &[], created());

        let req = Request::builder().uri("/things?x=1").body(Body::empty()).unwrap();
        handler.call(req).await;

        let out = captured.contents();
        let start = out.lines().find(|l| l.contains("START")).unwrap();
        assert!(start.contains("request_id=<nil>"));
        assert!(start.contains("method=GET"));
        assert!(start.contains("uri=/things?x=1"));

        let end = out.lines().find(|l| l.contains("END")).unwrap();
        assert!(end.contains("request_id=<nil>"));
        assert!(end.contains("status=201"));
    }

    #[tokio::test]
    async fn test_logger_with_request_id() {
        let (captured, _guard) = capture();
        let handler = compose(&[logger()], &[], created());

        let mut req = Request::new(Body::empty());
        let id = RequestIdGenerator::with_prefix("host/abc").from_header_or_new("host/abc-000007");
        req.extensions_mut().insert(id);
        handler.call(req).await;

        let out = captured.contents();
        assert_eq!(out.matches("request_id=host/abc-000007").count(), 2);
        assert!(!out.contains("<nil>"));
    }
}
