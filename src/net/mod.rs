//! Network layer subsystem.
//!
//! TCP accept and connection handling belong to `axum_server`; this layer
//! only prepares what it needs, i.e. the TLS configuration for
//! `bind_rustls`.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
