//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     Router::handle(method, path, handler, route_middleware)
//!     → path.rs (join prefix + path, canonicalize)
//!     → chain.rs (router middleware, then route middleware, around handler)
//!     → engine.rs (register in the shared axum::Router)
//!
//! Serving:
//!     Request → engine (axum match) → composed handler → Response
//! ```
//!
//! # Design Decisions
//! - Handlers are composed once, at registration time
//! - All routers of one tree share a single engine
//! - Sub-routers copy the parent's middleware at creation time

pub mod chain;
pub mod engine;
pub mod path;
pub mod router;

pub use chain::{compose, Handler, Middleware, Next};
pub use engine::RouteError;
pub use router::Router;
