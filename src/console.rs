//! Operator-facing output.
//!
//! Status lines, decoded chat and prompts go to a [`Console`]. Diagnostics
//! go through `tracing` instead.

use std::io::Write;

/// Line-oriented output sink.
pub trait Console {
    /// Print one line.
    fn line(&mut self, text: &str);

    /// Clear the screen.
    fn clear(&mut self);
}

/// Writes to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the client down
        let _ = writeln!(out, "{text}");
    }

    fn clear(&mut self) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\x1b[2J\x1b[H");
        let _ = out.flush();
    }
}
