//! HTTP server lifecycle.
//!
//! # Responsibilities
//! - Serve a configured `Router` over HTTP or HTTPS
//! - React to the first shutdown trigger (signal or caller token)
//! - Drain in-flight requests within a bounded window
//! - Run cleanup callbacks, last registered first
//!
//! # Design Decisions
//! - TLS and plain HTTP share one state machine; only the bind call differs
//! - Listener and TLS failures are returned, never swallowed
//! - A listener closed by our own shutdown is success, not an error

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;

use crate::config::{ListenerConfig, ServerConfig};
use crate::lifecycle::signals::spawn_signal_watcher;
use crate::lifecycle::{CleanupStack, ServerState, Shutdown};
use crate::net::tls::{load_tls_config, TlsError};
use crate::routing::Router;

/// Error type for running a server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The bind address could not be parsed.
    #[error("invalid bind address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The TLS certificate/key pair could not be loaded.
    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    /// The listener failed to bind or stopped without a shutdown request.
    #[error("listener failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The listener reported an error while draining.
    #[error("graceful shutdown failed: {0}")]
    Drain(#[source] std::io::Error),

    /// The serving task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
}

/// HTTP server with signal- and token-driven graceful shutdown.
pub struct HttpServer {
    app: axum::Router,
    listener: ListenerConfig,
    drain_timeout: Duration,
    handle_signals: bool,
    shutdown: Shutdown,
    cleanup: CleanupStack,
    handle: Handle,
    state: Arc<watch::Sender<ServerState>>,
}

impl HttpServer {
    /// Create a server for `router` from `config`.
    pub fn new(router: Router, config: &ServerConfig) -> Self {
        let (state, _) = watch::channel(ServerState::Starting);
        Self {
            app: router.into_service(),
            listener: config.listener.clone(),
            drain_timeout: config.shutdown.drain_timeout(),
            handle_signals: config.shutdown.handle_signals,
            shutdown: Shutdown::new(),
            cleanup: CleanupStack::new(),
            handle: Handle::new(),
            state: Arc::new(state),
        }
    }

    /// Use `shutdown` as the caller-controlled shutdown trigger.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Override the drain window from the configuration.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Register a cleanup callback. Callbacks run in reverse registration order.
    pub fn on_shutdown<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanup.push(f);
        self
    }

    /// The token that stops this server when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Watch the server's lifecycle state.
    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Handle to the underlying listener (bound address, connection count).
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Serve until shutdown is triggered, then drain and clean up.
    pub async fn run(self) -> Result<(), ServerError> {
        let HttpServer {
            app,
            listener,
            drain_timeout,
            handle_signals,
            shutdown,
            cleanup,
            handle,
            state,
        } = self;

        let addr: SocketAddr = listener
            .bind_address
            .parse()
            .map_err(|source| ServerError::Address {
                address: listener.bind_address.clone(),
                source,
            })?;

        let make_service = app.into_make_service();
        let mut serve_task = match &listener.tls {
            None => tokio::spawn(axum_server::bind(addr).handle(handle.clone()).serve(make_service)),
            Some(tls) => {
                let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
                    .await
                    .inspect_err(|e| tracing::error!(error = %e, "TLS setup failed"))?;
                tokio::spawn(
                    axum_server::bind_rustls(addr, rustls)
                        .handle(handle.clone())
                        .serve(make_service),
                )
            }
        };

        let signal_task = handle_signals.then(|| spawn_signal_watcher(shutdown.clone()));

        // Startup settles before the shutdown token is looked at, so a
        // failed bind is always reported as such.
        let startup = tokio::select! {
            biased;
            local = handle.listening() => Ok(local),
            res = &mut serve_task => Err(res),
        };

        let early_exit = match startup {
            Err(res) => Some(res),
            Ok(None) => Some((&mut serve_task).await),
            Ok(Some(local)) => {
                tracing::info!(address = %local, tls = listener.tls.is_some(), "Listening for connections");
                state.send_replace(ServerState::Running);

                tokio::select! {
                    biased;
                    res = &mut serve_task => Some(res),
                    _ = shutdown.triggered() => None,
                }
            }
        };

        if let Some(res) = early_exit {
            if let Some(task) = signal_task {
                task.abort();
            }
            state.send_replace(ServerState::Stopped);

            let err = match res {
                Ok(Ok(())) => ServerError::Bind(std::io::Error::other("listener exited without a shutdown request")),
                Ok(Err(e)) => ServerError::Bind(e),
                Err(e) => ServerError::Task(e),
            };
            tracing::error!(address = %addr, error = %err, "HTTP server failed");
            return Err(err);
        }

        tracing::info!(
            drain_timeout = ?drain_timeout,
            connections = handle.connection_count(),
            "Shutting down the server"
        );
        state.send_replace(ServerState::Draining);
        handle.graceful_shutdown(Some(drain_timeout));

        let drained = serve_task.await;

        let report = cleanup.run_blocking().await;

        if let Some(task) = signal_task {
            task.abort();
        }
        state.send_replace(ServerState::Stopped);

        match drained {
            Ok(Ok(())) => {
                tracing::info!(
                    cleanup_ran = report.ran,
                    cleanup_failed = report.failed,
                    "Server exited successfully"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Server shutdown failed");
                Err(ServerError::Drain(e))
            }
            Err(e) => {
                tracing::error!(error = %e, "Server task failed during shutdown");
                Err(ServerError::Task(e))
            }
        }
    }
}
