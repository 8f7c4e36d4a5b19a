//! # Tether - Resilient Game Server Client
//!
//! Keeps a headless client attached to a game server for as long as the
//! process runs: it negotiates a protocol version from a fallback ladder,
//! reconnects after kicks and network failures, keeps the session from being
//! flagged idle, and relays chat between the server and the console.
//!
//! ## Architecture
//!
//! ```text
//!   stdin ──lines──┐
//!                  │
//!   signals ───────┼──> runtime (select!) ──> Supervisor ──> GameSession
//!                  │                            │   ^            │
//!   timers ────────┘                            │   │ events     │
//!                                               │   └────────────┘
//!                                               ├──> Console
//!                                               └──> Notifier (webhook)
//! ```
//!
//! Everything runs on one task. The [`supervisor::Supervisor`] is a plain
//! state machine that takes the current instant as an argument; the
//! [`runtime`] feeds it inputs and sleeps until its next deadline.
//!
//! ## Connection Lifecycle
//!
//! ```text
//!     [Idle] ──connect──> [Connecting] ─────spawn─────> [Ready]
//!                              │                           │
//!                              └──── failure ──> [Ended] <─┘
//!                                                   │
//!                                  reconnect timer ─┘
//! ```
//!
//! | Failure                    | Effect                              |
//! |----------------------------|-------------------------------------|
//! | Protocol mismatch          | Next version in 2s                  |
//! | Kick / end / network error | Same ladder position in 5s          |
//! | Authentication error       | Retry in 30s                        |
//! | Ladder exhausted           | Rewind in 10s; exit 1 after 3 times |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::{BridgeFactory, Config, Supervisor, SupervisorConfig};
//! use tokio::sync::mpsc;
//!
//! let config = Config::load(None)?;
//! let (tx, rx) = mpsc::unbounded_channel();
//! let supervisor = Supervisor::new(
//!     SupervisorConfig::from_config(&config)?,
//!     Box::new(BridgeFactory::new("node", vec!["bridge.js".into()])),
//!     tx,
//! );
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! let code = tether::runtime::run(supervisor, rx, stdin).await;
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Versions, negotiation, session interface and bridge backend
//! - [`supervisor`]: Connection state machine and timers
//! - [`chat`]: Inbound decoding and outbound encoding
//! - [`security`]: Outbound safety filter
//! - [`liveness`]: Anti-idle driver
//! - [`auth`]: Credential providers
//! - [`notify`]: Webhook notifications
//! - [`runtime`]: Event loop
//! - [`config`]: Configuration management
//! - [`error`]: Error types and failure classification

pub mod auth;
pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod liveness;
pub mod notify;
pub mod protocol;
pub mod runtime;
pub mod security;
pub mod supervisor;

pub use auth::{AuthMode, AuthProvider, Credentials};
pub use chat::{ConsoleCommand, Decoder, Outbound};
pub use config::{Config, ConfigOverlay};
pub use console::{Console, StdoutConsole};
pub use error::{FailureClass, Result, TetherError};
pub use liveness::LivenessDriver;
pub use notify::{Notifier, WebhookNotifier};
pub use protocol::{
    BridgeFactory, GameSession, GameVersion, Negotiator, SessionEvent, SessionFactory,
    VersionLadder,
};
pub use security::SafetyFilter;
pub use supervisor::{Flow, SessionState, Supervisor, SupervisorConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
