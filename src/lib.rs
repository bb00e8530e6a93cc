//! Switchyard: middleware composition, sub-routing and a lifecycle-managed
//! HTTP listener on top of axum.
//!
//! ```rust,ignore
//! let ids = Arc::new(RequestIdGenerator::new());
//!
//! let mut root = Router::new();
//! root.use_all([recoverer(), request_id(ids), logger()]);
//! root.get("/", |_req| async { "home" })?;
//!
//! let mut api = root.subrouter("/api");
//! api.use_middleware(no_cache());
//! api.get("/users/{id}", show_user)?;
//!
//! HttpServer::new(root, &ServerConfig::default())
//!     .on_shutdown(|| close_database())
//!     .run()
//!     .await?;
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{HttpServer, RequestId, RequestIdExt, RequestIdGenerator, ServerError};
pub use lifecycle::{ServerState, Shutdown};
pub use routing::{Handler, Middleware, Next, RouteError, Router};
