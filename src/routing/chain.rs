//! Handler and middleware composition.
//!
//! # Data Flow
//! ```text
//! compose([A, B], [C, D], handler)
//!     → D(handler) → C(..) → B(..) → A(..)
//!
//! Execution:
//!     A → B → C → D → handler
//! ```
//!
//! # Design Decisions
//! - Composition happens once, at registration time
//! - Handlers and middleware are cheap to clone (`Arc` inside)
//! - A middleware may short-circuit by not calling `Next::run`

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

/// Boxed future returned by a [`Handler`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A type-erased async request handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>);

impl Handler {
    /// Wrap an async function as a handler.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req: Request| -> BoxFuture {
            let fut = f(req);
            Box::pin(async move { fut.await.into_response() })
        }))
    }

    /// Invoke the handler.
    pub fn call(&self, req: Request) -> BoxFuture {
        (self.0)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// The remainder of a middleware chain.
pub struct Next(Handler);

impl Next {
    /// Run the rest of the chain.
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }
}

/// A function that wraps a handler in another handler.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Handler) -> Handler + Send + Sync>);

impl Middleware {
    /// Build a middleware from a handler transformer.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Build a middleware from an async function taking the request and
    /// the rest of the chain.
    ///
    /// ```rust,ignore
    /// let mw = Middleware::from_fn(|req, next: Next| async move {
    ///     let mut res = next.run(req).await;
    ///     res.headers_mut().insert("x-served-by", HeaderValue::from_static("switchyard"));
    ///     res
    /// });
    /// ```
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let f = Arc::new(f);
        Self::new(move |inner: Handler| {
            let f = Arc::clone(&f);
            Handler::new(move |req| (*f)(req, Next(inner.clone())))
        })
    }

    /// Wrap `handler`.
    pub fn wrap(&self, handler: Handler) -> Handler {
        (self.0)(handler)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Compose `outer` then `inner` around `terminal`.
///
/// Execution order is every wrapper of `outer` in order, then every
/// wrapper of `inner` in order, then `terminal`. Neither slice is modified.
pub fn compose(outer: &[Middleware], inner: &[Middleware], terminal: Handler) -> Handler {
    let handler = inner.iter().rev().fold(terminal, |h, mw| mw.wrap(h));
    outer.iter().rev().fold(handler, |h, mw| mw.wrap(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    fn marker(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Middleware {
        let log = Arc::clone(log);
        Middleware::from_fn(move |req, next: Next| {
            log.lock().unwrap().push(name);
            next.run(req)
        })
    }

    fn terminal(log: &Arc<Mutex<Vec<&'static str>>>) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |_req| {
            log.lock().unwrap().push("handler");
            async { (StatusCode::OK, "done") }
        })
    }

    #[tokio::test]
    async fn test_compose_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer = [marker(&log, "A"), marker(&log, "B")];
        let inner = [marker(&log, "C"), marker(&log, "D")];

        let handler = compose(&outer, &inner, terminal(&log));
        let res = handler.call(Request::new(Body::empty())).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C", "D", "handler"]);
    }

    #[tokio::test]
    async fn test_compose_single_group() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = compose(&[], &[marker(&log, "C")], terminal(&log));
        handler.call(Request::new(Body::empty())).await;
        assert_eq!(*log.lock().unwrap(), vec!["C", "handler"]);

        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = compose(&[marker(&log, "A")], &[], terminal(&log));
        handler.call(Request::new(Body::empty())).await;
        assert_eq!(*log.lock().unwrap(), vec!["A", "handler"]);
    }

    #[tokio::test]
    async fn test_empty_compose_matches_terminal() {
        let plain = Handler::new(|_req| async { (StatusCode::ACCEPTED, "same") });
        let composed = compose(&[], &[], plain.clone());

        let a = plain.call(Request::new(Body::empty())).await;
        let b = composed.call(Request::new(Body::empty())).await;
        assert_eq!(a.status(), b.status());

        let a = axum::body::to_bytes(a.into_body(), usize::MAX).await.unwrap();
        let b = axum::body::to_bytes(b.into_body(), usize::MAX).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let deny = Middleware::from_fn(|_req, _next: Next| async { StatusCode::FORBIDDEN });

        let handler = compose(&[deny], &[marker(&log, "C")], terminal(&log));
        let res = handler.call(Request::new(Body::empty())).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }
}
