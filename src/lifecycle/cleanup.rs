//! Shutdown callbacks.
//!
//! # Responsibilities
//! - Store cleanup callbacks in registration order
//! - Run them last-registered-first, one at a time
//!
//! # Design Decisions
//! - A panicking callback is logged and counted; the rest still run
//! - Callbacks run on a single blocking task so they may block freely

use std::panic::AssertUnwindSafe;

use crate::http::middleware::recoverer::panic_message;

type CleanupFn = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of running a `CleanupStack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    /// Callbacks invoked.
    pub ran: usize,
    /// Callbacks that panicked.
    pub failed: usize,
}

/// Ordered cleanup callbacks.
#[derive(Default)]
pub struct CleanupStack {
    callbacks: Vec<CleanupFn>,
}

impl CleanupStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It will run before every callback registered earlier.
    pub fn push<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.callbacks.push(Box::new(f));
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback on the current thread, last registered first.
    pub fn run(self) -> CleanupReport {
        let total = self.callbacks.len();
        if total > 0 {
            tracing::info!(total, "Running shutdown functions");
        }

        let mut report = CleanupReport::default();
        for (step, callback) in self.callbacks.into_iter().rev().enumerate() {
            tracing::debug!(step = step + 1, total, "Running shutdown function");
            report.ran += 1;

            if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(callback)) {
                report.failed += 1;
                tracing::error!(
                    step = step + 1,
                    total,
                    panic = %panic_message(panic.as_ref()),
                    "Shutdown function panicked"
                );
            }
        }
        report
    }

    /// Run every callback on one dedicated blocking task.
    pub async fn run_blocking(self) -> CleanupReport {
        let total = self.len();
        match tokio::task::spawn_blocking(move || self.run()).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, total, "Shutdown function task failed");
                CleanupReport { ran: 0, failed: total }
            }
        }
    }
}
