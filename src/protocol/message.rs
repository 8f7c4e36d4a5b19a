//! Events raised by a game session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::auth::DeviceCode;

/// Identifies one connection attempt; events from stale attempts are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structured chat payload as delivered by the protocol layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Structured-text tree (string, `{text}`, `{extra}`, `{translate, with}`).
    pub json: Value,
    /// Plain rendering, when the protocol layer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain: Option<String>,
}

impl ChatPayload {
    /// Payload with only a structured tree.
    pub fn from_json(json: Value) -> Self {
        Self { json, plain: None }
    }

    /// Payload with a plain rendering.
    pub fn with_plain(mut self, plain: impl Into<String>) -> Self {
        self.plain = Some(plain.into());
        self
    }
}

/// What happened on the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    /// Login finished; the server assigned a display name.
    Login {
        /// Assigned display name.
        username: String,
    },
    /// Player entity spawned in the world.
    Spawn,
    /// Broadcast or chat message.
    Message(ChatPayload),
    /// Removed from the server; payload is the raw reason.
    Kicked(Value),
    /// Player entity died.
    Death,
    /// Low-level client stream error.
    StreamError(String),
    /// Session-level error.
    Error(String),
    /// Connection closed.
    End,
    /// Interactive sign-in is required.
    AuthPrompt(DeviceCode),
}

impl SessionEventKind {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Spawn => "spawn",
            Self::Message(_) => "message",
            Self::Kicked(_) => "kicked",
            Self::Death => "death",
            Self::StreamError(_) => "stream_error",
            Self::Error(_) => "error",
            Self::End => "end",
            Self::AuthPrompt(_) => "auth_prompt",
        }
    }
}

/// A session event tagged with its attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Attempt that raised the event.
    pub attempt: AttemptId,
    /// The event itself.
    pub kind: SessionEventKind,
}

/// Handle a session backend uses to publish events.
#[derive(Debug, Clone)]
pub struct EventSink {
    attempt: AttemptId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    /// Create a sink for one attempt.
    pub fn new(attempt: AttemptId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { attempt, tx }
    }

    /// Attempt this sink belongs to.
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Publish an event. Returns false once the receiver is gone.
    pub fn emit(&self, kind: SessionEventKind) -> bool {
        self.tx
            .send(SessionEvent {
                attempt: self.attempt,
                kind,
            })
            .is_ok()
    }
}
