//! Server lifecycle states.

use std::fmt;

/// Where a server is in its lifecycle.
///
/// ```text
/// Starting → Running → Draining → Stopped
/// ```
///
/// `Running` is best-effort: it is entered once the listener reports its
/// bound address. A server whose listener fails goes straight to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Binding the listener.
    Starting,
    /// Accepting connections.
    Running,
    /// No longer accepting; in-flight requests are finishing.
    Draining,
    /// Drained and cleaned up.
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServerState::Starting => "starting",
            ServerState::Running => "running",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
