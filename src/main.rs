//! Switchyard demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum_server (HTTP / HTTPS)
//!                          │
//!                          ▼
//!                   routing engine ─── not found ──▶ 404 handler
//!                          │
//!                          ▼
//!     recoverer → request_id → logger → [subrouter middleware] → handler
//!                          │
//!     Client Response ◀────┘
//!
//!     SIGINT / SIGTERM ──▶ Shutdown ──▶ drain (bounded) ──▶ cleanup (LIFO)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{HeaderName, StatusCode};
use clap::Parser;
use serde_json::json;

use switchyard::config::{load_config, validate_config, ServerConfig};
use switchyard::http::middleware::{heartbeat, logger, no_cache, recoverer, request_id_from_header, timeout};
use switchyard::http::{query_params, response, url_params};
use switchyard::observability::init_logging;
use switchyard::{HttpServer, RequestIdExt, RequestIdGenerator, Router};

#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about = "Switchyard demo HTTP server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(switchyard::config::ConfigError::Validation)?;
    }

    init_logging(&config.observability)?;

    tracing::info!("switchyard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    let router = build_router(&config)?;

    HttpServer::new(router, &config)
        .on_shutdown(|| tracing::info!("Flushing demo state"))
        .on_shutdown(|| tracing::info!("Closing demo connections"))
        .run()
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(config: &ServerConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let ids = Arc::new(RequestIdGenerator::new());
    let header = HeaderName::try_from(config.request_id.header.as_str())?;

    let mut root = Router::new();
    root.use_all([
        recoverer(),
        request_id_from_header(ids, header),
        logger(),
        heartbeat("/ping"),
    ]);

    // heartbeat only sees matched routes
    root.get("/ping", |_req: Request| async { StatusCode::OK })?;

    root.get("/", |req: Request| async move {
        response::json(
            StatusCode::OK,
            &json!({ "service": "switchyard", "request_id": req.request_id() }),
        )
    })?;

    root.not_found(|req: Request| async move {
        response::text(StatusCode::NOT_FOUND, format!("no route for {}", req.uri().path()))
    });

    let mut api = root.subrouter("/api");
    api.use_middleware(no_cache());

    api.get("/users/{id}", |mut req: Request| async move {
        let params = url_params(&mut req).await;
        response::json(StatusCode::OK, &params)
    })?;

    api.get("/search", |req: Request| async move {
        response::json(StatusCode::OK, &query_params(&req))
    })?;

    api.handle(
        axum::http::Method::GET,
        "/slow",
        switchyard::Handler::new(|_req: Request| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            response::text(StatusCode::OK, "finally")
        }),
        &[timeout(Duration::from_secs(1))],
    )?;

    Ok(root)
}
