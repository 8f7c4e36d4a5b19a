//! Tether error types.
//!
//! Errors split into two groups. Connection-lifecycle failures
//! ([`TetherError::VersionMismatch`], [`TetherError::HandshakeTimeout`],
//! [`TetherError::Network`], [`TetherError::Auth`], [`TetherError::Decode`],
//! [`TetherError::LadderExhausted`]) drive explicit supervisor transitions
//! through [`TetherError::class`]. Everything else is contained where it
//! happens and logged at most.
//!
//! Session backends only report errors as message strings;
//! [`TetherError::from_session`] lifts them into the taxonomy.

use thiserror::Error;

/// Tether errors.
#[derive(Error, Debug)]
pub enum TetherError {
    /// Handshake framing error: the server speaks a different protocol version.
    #[error("Protocol mismatch for version {version}: {message}")]
    VersionMismatch {
        /// Version that was attempted.
        version: String,
        /// Underlying decoder message.
        message: String,
    },

    /// No ready signal within the handshake window.
    #[error("Version {version} timed out after {secs}s")]
    HandshakeTimeout {
        /// Version that was attempted.
        version: String,
        /// Length of the window.
        secs: u64,
    },

    /// Network-level failure (connect, read, write).
    #[error("Network error: {0}")]
    Network(String),

    /// Credential or profile failure.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Every candidate version failed repeatedly.
    #[error("Could not connect with any version after {attempts} full attempts")]
    LadderExhausted {
        /// Number of full ladder traversals made.
        attempts: u32,
    },

    /// Session backend failure.
    #[error("Session error: {0}")]
    Session(String),

    /// Operation requires a live session.
    #[error("Session closed")]
    SessionClosed,

    /// Outbound message rejected by the safety filter.
    #[error("Message blocked: {0}")]
    Blocked(String),

    /// Inbound packet or payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Webhook delivery failed.
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tether operations
pub type Result<T> = std::result::Result<T, TetherError>;

impl From<reqwest::Error> for TetherError {
    fn from(err: reqwest::Error) -> Self {
        TetherError::Webhook(err.to_string())
    }
}

impl From<toml::de::Error> for TetherError {
    fn from(err: toml::de::Error) -> Self {
        TetherError::Config(err.to_string())
    }
}

/// How a failure message reported by a session affects the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Framing/decoding failure during handshake; try the next version.
    VersionMismatch,
    /// Non-critical parse noise; no state change.
    Ignorable,
    /// Credential/profile failure; back off longer.
    Auth,
    /// Anything else; standard reconnect.
    Transient,
}

const AUTH_MARKERS: &[&str] = &[
    "credential",
    "profile",
    "authenticat",
    "unauthorized",
    "invalid session",
];

impl FailureClass {
    /// Classify an error message.
    pub fn classify(message: &str) -> Self {
        if message.contains("PartialReadError") || message.contains("Read error") {
            return Self::VersionMismatch;
        }
        if message.contains("Parse error") {
            return Self::Ignorable;
        }
        let lower = message.to_lowercase();
        if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
            return Self::Auth;
        }
        Self::Transient
    }
}

impl TetherError {
    /// Lift a failure message reported by a session running `version`.
    pub fn from_session(version: impl Into<String>, message: &str) -> Self {
        match FailureClass::classify(message) {
            FailureClass::VersionMismatch => TetherError::VersionMismatch {
                version: version.into(),
                message: message.to_string(),
            },
            FailureClass::Ignorable => TetherError::Decode(message.to_string()),
            FailureClass::Auth => TetherError::Auth(message.to_string()),
            FailureClass::Transient => TetherError::Network(message.to_string()),
        }
    }

    /// How this error affects the connection.
    pub fn class(&self) -> FailureClass {
        match self {
            TetherError::VersionMismatch { .. } | TetherError::HandshakeTimeout { .. } => {
                FailureClass::VersionMismatch
            },
            TetherError::Decode(_) => FailureClass::Ignorable,
            TetherError::Auth(_) => FailureClass::Auth,
            TetherError::Session(msg) => FailureClass::classify(msg),
            _ => FailureClass::Transient,
        }
    }
}
