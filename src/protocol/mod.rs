//! Game protocol versions, negotiation, and the session collaborator.
//!
//! The wire protocol itself is provided by a backend implementing
//! [`SessionFactory`]; this module only decides *which* version to speak and
//! describes the events a backend reports.
//!
//! # Version Negotiation
//!
//! Candidates are attempted in ladder order. A framing error during the
//! handshake means the server speaks a different version, so the next
//! candidate is tried after [`MISMATCH_RETRY_SECS`]. Running off the end of
//! the ladder rewinds it and waits [`LADDER_RESTART_SECS`]; after
//! [`MAX_LADDER_ATTEMPTS`] rewinds the process gives up.
//!
//! | Failure                        | Index     | Retry after |
//! |--------------------------------|-----------|-------------|
//! | Framing error (`PartialReadError`) | advance | 2s          |
//! | No spawn within 15s            | advance   | 2s          |
//! | Network / kick / end           | unchanged | 5s          |
//! | Ladder end                     | reset to 0| 10s         |
//!
//! # Session Events
//!
//! | Event          | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `Login`        | Authenticated; display name assigned      |
//! | `Spawn`        | Player entity in the world; session ready |
//! | `Message`      | Structured chat/broadcast payload         |
//! | `Kicked`       | Removed by the server, with reason        |
//! | `Death`        | Player entity died                        |
//! | `StreamError`  | Low-level client error                    |
//! | `Error`        | Session-level error                       |
//! | `End`          | Connection closed                         |
//! | `AuthPrompt`   | Device-code sign-in required              |

mod bridge;
mod message;
mod negotiator;
mod session;
mod version;

pub use bridge::{BridgeFactory, BridgeSession};
pub use message::{AttemptId, ChatPayload, EventSink, SessionEvent, SessionEventKind};
pub use negotiator::{Candidate, Negotiator};
pub use session::{Control, GameSession, SessionFactory, SessionOptions};
pub use version::{GameVersion, VersionLadder};

/// Versions tried when none is pinned, newest first.
pub const DEFAULT_LADDER: &[&str] = &[
    "1.21.4", "1.21.3", "1.21.1", "1.21", "1.20.6", "1.20.4", "1.20.2", "1.20.1",
];

/// Default server port.
pub const DEFAULT_PORT: u16 = 25565;

/// Full ladder traversals allowed before giving up.
pub const MAX_LADDER_ATTEMPTS: u32 = 3;

/// Delay before trying the next candidate after a mismatch.
pub const MISMATCH_RETRY_SECS: u64 = 2;

/// Delay before rewinding an exhausted ladder.
pub const LADDER_RESTART_SECS: u64 = 10;

/// Handshake must produce a ready signal within this window.
pub const HANDSHAKE_TIMEOUT_SECS: u64 = 15;

/// Keep-alive timeout handed to the protocol layer.
pub const KEEP_ALIVE_SECS: u64 = 120;
