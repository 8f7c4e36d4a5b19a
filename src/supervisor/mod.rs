//! Reconnection supervisor.
//!
//! A single state machine owns the live session, the version negotiator,
//! the anti-idle driver and every timer. It never blocks and never reads
//! the clock: callers pass `now`, and [`Supervisor::next_deadline`] tells
//! the runtime when to call [`Supervisor::fire_due`] next.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──connect──> Connecting ─────spawn─────> Ready
//!                        │   │                      │
//!          mismatch/timeout  kick/end/error   kick/end/error
//!                        │   │                      │
//!                        v   v                      v
//!                        Ended <────────────────────┘
//!                          │
//!                          └── reconnect timer ──> connect
//!
//!   any state ──shutdown──> Terminal
//! ```
//!
//! # Delays
//!
//! | Trigger                       | Delay | Ladder            |
//! |-------------------------------|-------|-------------------|
//! | Protocol mismatch / timeout   | 2s    | next version      |
//! | Kick, end, transient error    | 5s    | unchanged         |
//! | Authentication error          | 30s   | unchanged         |
//! | Ladder exhausted (restart)    | 10s   | rewound           |
//! | Death                         | 1s    | respawn, no reconnect |
//!
//! `Login` only records the display name; `Spawn` is the ready transition.
//!
//! Events are tagged with the attempt that produced them. Once a session
//! is torn down its attempt id no longer matches, so late events from it
//! are dropped and can never trigger a second reconnect.

mod action;
mod connection;
mod teardown;
mod timers;

pub use action::PendingAction;
pub use connection::{SessionState, Supervisor, SupervisorConfig};
pub use teardown::{TeardownReason, TeardownReport};
pub use timers::{TimerKind, Timers};

/// Standard reconnect delay.
pub const RECONNECT_DELAY_SECS: u64 = 5;

/// Reconnect delay after an authentication failure.
pub const AUTH_BACKOFF_SECS: u64 = 30;

/// Delay before respawning after death.
pub const RESPAWN_DELAY_SECS: u64 = 1;

/// Exit code for a normal shutdown.
pub const EXIT_OK: i32 = 0;

/// Exit code when no version could be negotiated.
pub const EXIT_EXHAUSTED: i32 = 1;

/// What the runtime should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Exit the process with this code.
    Exit(i32),
}
