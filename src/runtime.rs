//! Event loop.
//!
//! Everything runs on one task: session events, console lines, timers and
//! shutdown signals are multiplexed with `tokio::select!` and handed to the
//! [`Supervisor`] one at a time, so handlers never interleave.

use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::protocol::SessionEvent;
use crate::supervisor::{Flow, Supervisor};

/// Drive the supervisor until it asks to exit. Returns the exit code.
///
/// Console lines are read from `input`; end of input stops reading but
/// keeps the client running.
pub async fn run<R>(
    mut supervisor: Supervisor,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    input: R,
) -> i32
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let mut signals = Signals::new();

    supervisor.announce();
    if let Flow::Exit(code) = supervisor.connect(Instant::now()) {
        return code;
    }

    loop {
        let deadline = supervisor.next_deadline();
        let flow = tokio::select! {
            Some(event) = events.recv() => supervisor.handle_event(event, Instant::now()),
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => supervisor.handle_line(&line, Instant::now()),
                Ok(None) => {
                    tracing::debug!("Console input closed");
                    input_open = false;
                    Flow::Continue
                },
                Err(e) => {
                    tracing::warn!("Console input failed: {e}");
                    input_open = false;
                    Flow::Continue
                },
            },
            () = sleep_until(deadline) => {
                // Never fire with a clock reading earlier than the deadline that woke us
                let now = deadline.map_or_else(Instant::now, |at| at.max(Instant::now()));
                supervisor.fire_due(now)
            },
            name = signals.recv() => {
                tracing::info!("Received {name}");
                supervisor.shutdown()
            },
        };

        if let Flow::Exit(code) = flow {
            return code;
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

/// Process termination signals.
struct Signals {
    #[cfg(unix)]
    interrupt: Option<tokio::signal::unix::Signal>,
    #[cfg(unix)]
    terminate: Option<tokio::signal::unix::Signal>,
}

impl Signals {
    #[cfg(unix)]
    fn new() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind, name: &str| match signal(kind) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Could not install {name} handler: {e}");
                None
            },
        };
        Self {
            interrupt: install(SignalKind::interrupt(), "SIGINT"),
            terminate: install(SignalKind::terminate(), "SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    fn new() -> Self {
        Self {}
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> &'static str {
        async fn wait(signal: Option<&mut tokio::signal::unix::Signal>) {
            match signal {
                Some(s) => {
                    if s.recv().await.is_none() {
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending().await,
            }
        }

        tokio::select! {
            () = wait(self.interrupt.as_mut()) => "SIGINT",
            () = wait(self.terminate.as_mut()) => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl-C",
            Err(_) => std::future::pending().await,
        }
    }
}
