//! Standard middleware.
//!
//! Each function returns a `Middleware` ready for `Router::use_middleware`
//! or as route middleware in `Router::handle`.
//!
//! # Typical Stack
//! ```text
//! recoverer → request_id → logger → [router middleware] → [route middleware] → handler
//! ```

pub mod basic_auth;
pub mod heartbeat;
pub mod logger;
pub mod no_cache;
pub mod recoverer;
pub mod request_id;
pub mod timeout;

pub use basic_auth::basic_auth;
pub use heartbeat::heartbeat;
pub use logger::logger;
pub use no_cache::no_cache;
pub use recoverer::recoverer;
pub use request_id::{request_id, request_id_from_header};
pub use timeout::timeout;
