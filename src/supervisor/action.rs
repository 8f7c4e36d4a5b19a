//! One-shot command queued after a forced removal.

use std::time::Duration;

use crate::config::AutoActionConfig;

/// Command to run once after the next ready signal.
///
/// Armed by a kick, it stays armed across failed attempts and is consumed
/// when it actually runs, so each kick yields at most one execution.
#[derive(Debug, Clone, Default)]
pub struct PendingAction {
    command: Option<String>,
    delay: Duration,
    armed: bool,
}

impl PendingAction {
    /// Create with an optional command (leading `/` optional).
    pub fn new(command: Option<String>, delay: Duration) -> Self {
        let command = command
            .map(|c| c.trim().trim_start_matches('/').to_string())
            .filter(|c| !c.is_empty());
        Self {
            command,
            delay,
            armed: false,
        }
    }

    /// From configuration.
    pub fn from_config(config: &AutoActionConfig) -> Self {
        Self::new(config.command.clone(), config.delay())
    }

    /// Configured command, without the slash.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Delay after the ready signal.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm. Returns false when no command is configured.
    pub fn arm(&mut self) -> bool {
        self.armed = self.command.is_some();
        self.armed
    }

    /// Whether a run is pending.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Disarm and return the command if it was armed.
    pub fn take(&mut self) -> Option<String> {
        if std::mem::take(&mut self.armed) {
            self.command.clone()
        } else {
            None
        }
    }
}
