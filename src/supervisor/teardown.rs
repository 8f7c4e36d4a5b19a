//! Session teardown results.

use std::fmt;

use crate::protocol::AttemptId;

/// Why a session was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// A newer attempt replaced it.
    Superseded,
    /// It failed (kick, end, error, timeout).
    Failed,
    /// The process is shutting down.
    Shutdown,
}

impl TeardownReason {
    /// Reason handed to the server on quit.
    pub fn quit_message(&self) -> Option<&'static str> {
        match self {
            TeardownReason::Superseded => Some("Reconnecting"),
            TeardownReason::Failed => None,
            TeardownReason::Shutdown => Some("Shutting down"),
        }
    }
}

impl fmt::Display for TeardownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownReason::Superseded => write!(f, "superseded"),
            TeardownReason::Failed => write!(f, "failed"),
            TeardownReason::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// What happened while tearing a session down.
///
/// Teardown always completes; errors are collected here instead of
/// interrupting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// Attempt that was torn down.
    pub attempt: AttemptId,
    /// Why.
    pub reason: TeardownReason,
    /// Errors raised by the session while quitting.
    pub errors: Vec<String>,
}

impl TeardownReport {
    /// Start a report.
    pub fn new(attempt: AttemptId, reason: TeardownReason) -> Self {
        Self {
            attempt,
            reason,
            errors: Vec::new(),
        }
    }

    /// Whether every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
