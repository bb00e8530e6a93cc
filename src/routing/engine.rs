//! Shared matching engine.
//!
//! # Responsibilities
//! - Own the single `axum::Router` for a whole router tree
//! - Register composed handlers under canonical paths
//! - Hold the tree-wide not-found handler and static file mounts
//!
//! # Design Decisions
//! - One engine per tree; sub-routers share it through `SharedEngine`
//! - Exact `(method, path)` duplicates are reported as `RouteError::Duplicate`
//!   instead of reaching axum, which would panic
//! - A known path with an unregistered method is answered by the not-found
//!   handler, not 405
//! - Serving takes a snapshot of the routes; the not-found handler is read
//!   per request

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use tower_http::services::ServeDir;

use crate::routing::chain::Handler;

/// Error type for route registration.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The same method and path were registered twice.
    #[error("route already registered: {method} {path}")]
    Duplicate { method: Method, path: String },

    /// The engine has no method filter for this verb.
    #[error("unsupported routing method: {0}")]
    UnsupportedMethod(Method),
}

/// Tree-wide not-found handler, shared by the engine fallback and every
/// route's method fallback.
#[derive(Clone, Default)]
struct NotFound(Arc<RwLock<Option<Handler>>>);

impl NotFound {
    fn set(&self, handler: Handler) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    async fn respond(self, req: Request) -> Response {
        let handler = self.0.read().unwrap_or_else(PoisonError::into_inner).clone();
        match handler {
            Some(handler) => handler.call(req).await,
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

/// The matching engine wrapped by every `Router` of one tree.
pub struct Engine {
    inner: axum::Router,
    registered: BTreeSet<(String, String)>,
    not_found: NotFound,
}

impl Engine {
    /// Create an empty engine.
    pub fn new() -> Self {
        let not_found = NotFound::default();
        let fallback = not_found.clone();
        Self {
            inner: axum::Router::new().fallback(move |req: Request| fallback.clone().respond(req)),
            registered: BTreeSet::new(),
            not_found,
        }
    }

    fn check(&self, method: &Method, path: &str) -> Result<MethodFilter, RouteError> {
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RouteError::UnsupportedMethod(method.clone()))?;

        if self.registered.contains(&(path.to_string(), method.as_str().to_string())) {
            return Err(RouteError::Duplicate {
                method: method.clone(),
                path: path.to_string(),
            });
        }
        Ok(filter)
    }

    fn has_path(&self, path: &str) -> bool {
        self.registered.iter().any(|(p, _)| p == path)
    }

    /// Register `handler` for `method` at canonical `path`.
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) -> Result<(), RouteError> {
        let filter = self.check(&method, path)?;

        let mut route = on(filter, move |req: Request| handler.call(req));
        // axum refuses to merge two method fallbacks, so only the first
        // method registered on a path carries it.
        if !self.has_path(path) {
            let not_found = self.not_found.clone();
            route = route.fallback(move |req: Request| not_found.clone().respond(req));
        }
        self.inner = self.inner.clone().route(path, route);
        self.registered.insert((path.to_string(), method.as_str().to_string()));

        tracing::debug!(method = %method, path = %path, "Route registered");
        Ok(())
    }

    /// Register `handler` for every method in `methods`, or for none of them.
    pub fn register_many(&mut self, methods: &[Method], path: &str, handler: Handler) -> Result<(), RouteError> {
        for method in methods {
            self.check(method, path)?;
        }
        for method in methods {
            self.register(method.clone(), path, handler.clone())?;
        }
        Ok(())
    }

    /// Replace the not-found handler for the whole tree.
    pub fn set_not_found(&mut self, handler: Handler) {
        self.not_found.set(handler);
    }

    /// Serve files under `dir` at canonical `path`.
    pub fn serve_files(&mut self, path: &str, dir: &Path) {
        let service = ServeDir::new(dir);
        let inner = self.inner.clone();
        let mount = path.trim_end_matches('/');
        self.inner = if mount.is_empty() {
            inner.fallback_service(service)
        } else {
            inner.nest_service(mount, service)
        };

        tracing::debug!(path = %path, dir = ?dir, "Static files mounted");
    }

    /// Registered routes as `(path, method)` pairs, sorted.
    pub fn routes(&self) -> Vec<(String, String)> {
        self.registered.iter().cloned().collect()
    }

    /// A clone of the current routing table, ready to serve.
    pub fn snapshot(&self) -> axum::Router {
        self.inner.clone()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference-counted handle to one `Engine`.
#[derive(Clone, Default)]
pub struct SharedEngine(Arc<Mutex<Engine>>);

impl SharedEngine {
    /// Create a handle to a fresh engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the engine. The routing table is only swapped after a
    /// successful update, so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles refer to the same engine.
    pub fn ptr_eq(&self, other: &SharedEngine) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
