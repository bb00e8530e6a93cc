//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT and SIGTERM
//! - Translate the first one into `Shutdown::trigger()`
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A signal that cannot be registered is logged and never fires
//! - The watcher task is aborted by the server on exit

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_watcher(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let signal = tokio::select! {
            _ = interrupt() => "SIGINT",
            _ = terminate() => "SIGTERM",
        };
        tracing::info!(signal, "Shutdown signal received");
        shutdown.trigger();
    })
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install SIGINT handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::signal::unix::{signal, SignalKind};

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        // Keeps Tokio's SIGTERM handler installed so the process survives
        // a signal sent before the watcher registers.
        let _installed = signal(SignalKind::terminate()).unwrap();

        let shutdown = Shutdown::new();
        let watcher = spawn_signal_watcher(shutdown.clone());

        let pid = std::process::id().to_string();
        for _ in 0..50 {
            let status = std::process::Command::new("kill")
                .args(["-TERM", &pid])
                .status()
                .unwrap();
            assert!(status.success());

            if tokio::time::timeout(Duration::from_millis(100), shutdown.triggered())
                .await
                .is_ok()
            {
                break;
            }
        }

        assert!(shutdown.is_triggered());
        watcher.await.unwrap();
    }
}
