//! Route registration and sub-routing.
//!
//! # Responsibilities
//! - Own a canonical path prefix and an ordered middleware stack
//! - Compose each registered handler with the stack at registration time
//! - Spawn sub-routers that share the same matching engine
//!
//! # Design Decisions
//! - The middleware stack is an immutable `Arc<[Middleware]>`; `use_middleware`
//!   swaps in a new sequence, so a sub-router's snapshot can never change
//! - Middleware added after a route is registered does not apply to it
//! - Not-found handling is tree-wide (one engine, one fallback)

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::response::IntoResponse;
use tower_http::trace::TraceLayer;

use crate::routing::chain::{compose, Handler, Middleware};
use crate::routing::engine::{RouteError, SharedEngine};
use crate::routing::path;

/// Methods covered by [`Router::any`].
pub const ANY_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
];

/// A (sub)router: a path prefix plus a middleware stack over a shared engine.
pub struct Router {
    engine: SharedEngine,
    middleware: Arc<[Middleware]>,
    prefix: String,
}

impl Router {
    /// Create a root router with a fresh engine.
    pub fn new() -> Self {
        Self {
            engine: SharedEngine::new(),
            middleware: Arc::from(Vec::new()),
            prefix: "/".to_string(),
        }
    }

    /// Append a middleware to this router's stack.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.use_all([middleware])
    }

    /// Append several middleware, in order.
    pub fn use_all<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        let stack: Vec<Middleware> = self
            .middleware
            .iter()
            .cloned()
            .chain(middleware)
            .collect();
        self.middleware = Arc::from(stack);
        self
    }

    /// Create a sub-router rooted at `path` below this router.
    ///
    /// The sub-router starts with the middleware this router has now.
    pub fn subrouter(&self, path: &str) -> Router {
        let prefix = path::join(&self.prefix, path);
        tracing::debug!(prefix = %prefix, middleware = self.middleware.len(), "Subrouter created");

        Router {
            engine: self.engine.clone(),
            middleware: Arc::clone(&self.middleware),
            prefix,
        }
    }

    /// Register `handler` for `method` at `path`, wrapped by this router's
    /// middleware and then `route_middleware`.
    pub fn handle(
        &self,
        method: Method,
        path: &str,
        handler: Handler,
        route_middleware: &[Middleware],
    ) -> Result<(), RouteError> {
        let full_path = path::join(&self.prefix, path);
        let composed = compose(&self.middleware, route_middleware, handler);
        self.engine.lock().register(method, &full_path, composed)
    }

    fn handle_fn<F, Fut, R>(&self, method: Method, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle(method, path, Handler::new(f), &[])
    }

    /// Register a GET route.
    pub fn get<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::GET, path, f)
    }

    /// Register a HEAD route.
    pub fn head<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::HEAD, path, f)
    }

    /// Register an OPTIONS route.
    pub fn options<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::OPTIONS, path, f)
    }

    /// Register a POST route.
    pub fn post<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::POST, path, f)
    }

    /// Register a PUT route.
    pub fn put<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::PUT, path, f)
    }

    /// Register a PATCH route.
    pub fn patch<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::PATCH, path, f)
    }

    /// Register a DELETE route.
    pub fn delete<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handle_fn(Method::DELETE, path, f)
    }

    /// Register the same handler for every method in [`ANY_METHODS`].
    ///
    /// This is not a wildcard: other methods are not matched. If any of the
    /// methods is already taken on `path`, nothing is registered.
    pub fn any<F, Fut, R>(&self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let full_path = path::join(&self.prefix, path);
        let composed = compose(&self.middleware, &[], Handler::new(f));
        self.engine.lock().register_many(&ANY_METHODS, &full_path, composed)
    }

    /// Set the not-found handler. Applies to the whole router tree.
    pub fn not_found<F, Fut, R>(&self, f: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.engine.lock().set_not_found(Handler::new(f));
    }

    /// Serve files from `dir` under `path`. Router middleware does not apply.
    pub fn serve_files(&self, path: &str, dir: impl AsRef<Path>) {
        let full_path = path::join(&self.prefix, path);
        self.engine.lock().serve_files(&full_path, dir.as_ref());
    }

    /// Canonical prefix of this router.
    pub fn path_prefix(&self) -> &str {
        &self.prefix
    }

    /// Current middleware stack.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Registered `(path, method)` pairs across the whole tree.
    pub fn routes(&self) -> Vec<(String, String)> {
        self.engine.lock().routes()
    }

    /// Whether `other` belongs to the same router tree.
    pub fn shares_engine(&self, other: &Router) -> bool {
        self.engine.ptr_eq(&other.engine)
    }

    /// Build the servable `axum::Router` for the whole tree.
    pub fn into_service(self) -> axum::Router {
        self.engine.lock().snapshot().layer(TraceLayer::new_for_http())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
