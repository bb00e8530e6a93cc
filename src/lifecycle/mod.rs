//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! State machine (state.rs):
//!     Starting → Running → Draining → Stopped
//!
//! Shutdown triggers (shutdown.rs, signals.rs):
//!     SIGINT/SIGTERM ─┐
//!                     ├→ Shutdown::trigger() → Draining
//!     caller token ───┘
//!
//! Draining (cleanup.rs):
//!     Stop accepting → drain in-flight (bounded) → cleanup callbacks (LIFO)
//!     → release signal watcher → Stopped
//! ```
//!
//! # Design Decisions
//! - Signals and caller cancellation feed the same `Shutdown` token
//! - Whichever trigger fires first wins; both lead to the same drain
//! - Drain has a hard deadline; in-flight requests are cut after it
//! - Cleanup callbacks run sequentially on one task, last registered first

pub mod cleanup;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use cleanup::{CleanupReport, CleanupStack};
pub use shutdown::Shutdown;
pub use state::ServerState;
