//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (axum_server)
//!     → server.rs (lifecycle, graceful shutdown)
//!     → routing engine (match method + path)
//!     → composed chain: middleware/ (request_id, recoverer, logger, ...)
//!     → handler (request.rs helpers: request ID, URL/query params)
//!     → response.rs helpers
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{
    query_params, url_params, RequestId, RequestIdExt, RequestIdGenerator, X_REQUEST_ID,
};
pub use server::{HttpServer, ServerError};
