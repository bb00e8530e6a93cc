//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use switchyard::config::ServerConfig;
use switchyard::{HttpServer, Router, ServerError, ServerState, Shutdown};

/// A server running on an ephemeral local port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<ServerState>,
    pub task: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config bound to `127.0.0.1:0` with OS signal handling disabled.
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.shutdown.handle_signals = false;
    config
}

/// Spawn `server` and wait until it is accepting connections.
pub async fn spawn_server(server: HttpServer) -> RunningServer {
    let shutdown = server.shutdown_handle();
    let state = server.state();
    let handle = server.handle();

    let task = tokio::spawn(server.run());
    let addr = tokio::time::timeout(Duration::from_secs(5), handle.listening())
        .await
        .expect("server did not start in time")
        .expect("server failed to bind");

    RunningServer {
        addr,
        shutdown,
        state,
        task,
    }
}

/// Spawn `router` with the default local config.
pub async fn serve(router: Router) -> RunningServer {
    spawn_server(HttpServer::new(router, &local_config())).await
}

/// Send a single request through the router tree without a socket.
pub async fn oneshot(router: Router, req: Request<Body>) -> Response {
    router.into_service().oneshot(req).await.unwrap()
}

/// Build a GET request for `uri`.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read a response body as UTF-8.
pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Wait until `state` reports `want`.
pub async fn wait_for_state(state: &mut watch::Receiver<ServerState>, want: ServerState) {
    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == want))
        .await
        .expect("state transition timed out")
        .expect("state channel closed");
}
