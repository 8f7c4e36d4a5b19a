//! Game session collaborator interface.
//!
//! The wire protocol itself (handshake, framing, encryption) lives behind
//! [`GameSession`]. A [`SessionFactory`] builds one session per connection
//! attempt and hands it an [`EventSink`] tagged with that attempt's id.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::EventSink;
use super::version::GameVersion;
use crate::auth::{AuthMode, Credentials};
use crate::error::Result;

/// Momentary movement controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    /// Jump.
    Jump,
    /// Sneak.
    Sneak,
}

impl Control {
    /// Protocol name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::Jump => "jump",
            Control::Sneak => "sneak",
        }
    }
}

/// Everything a backend needs to open a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Protocol version to speak.
    pub version: GameVersion,
    /// Authentication mode.
    pub auth: AuthMode,
    /// Pre-fetched credentials, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Credential cache location.
    pub profiles_folder: PathBuf,
    /// View distance hint.
    pub view_distance: String,
    /// Skip server-side validation checks.
    pub skip_validation: bool,
    /// Suppress internal error logging in the protocol layer.
    pub hide_errors: bool,
    /// Keep-alive timeout, milliseconds on the wire.
    #[serde(rename = "check_timeout_ms", with = "duration_ms")]
    pub keep_alive: Duration,
}

impl SessionOptions {
    /// Options with the usual hints for a headless client.
    pub fn new(host: impl Into<String>, port: u16, version: GameVersion) -> Self {
        Self {
            host: host.into(),
            port,
            version,
            auth: AuthMode::default(),
            credentials: None,
            profiles_folder: PathBuf::new(),
            view_distance: "tiny".to_string(),
            skip_validation: true,
            hide_errors: true,
            keep_alive: Duration::from_secs(super::KEEP_ALIVE_SECS),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// A live connection to the game server.
///
/// All calls are best effort from the supervisor's point of view; errors
/// are logged and never crash the process.
pub trait GameSession {
    /// Whether a controllable player entity currently exists.
    fn has_entity(&self) -> bool;

    /// Send plain chat (the backend adds any required metadata).
    fn chat(&mut self, text: &str) -> Result<()>;

    /// Assert or clear a movement control.
    fn set_control_state(&mut self, control: Control, state: bool) -> Result<()>;

    /// Respawn after death.
    fn respawn(&mut self) -> Result<()>;

    /// Leave the server.
    fn quit(&mut self, reason: Option<&str>) -> Result<()>;

    /// Write a raw packet.
    fn write(&mut self, packet: &str, payload: Value) -> Result<()>;

    /// Stop delivering events and release resources.
    fn detach(&mut self);
}

/// Builds sessions, one per connection attempt.
pub trait SessionFactory {
    /// Start connecting. Events flow through `sink` until the session is detached.
    fn create(&mut self, options: &SessionOptions, sink: EventSink) -> Result<Box<dyn GameSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_wire_format() {
        let opts = SessionOptions::new("play.example.net", 25565, "1.21.4".parse().unwrap());
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["version"], "1.21.4");
        assert_eq!(json["check_timeout_ms"], 120_000);
        assert_eq!(json["view_distance"], "tiny");
        assert_eq!(json["auth"], "microsoft");
        assert!(json.get("credentials").is_none());
    }

    #[test]
    fn test_control_names() {
        assert_eq!(Control::Jump.as_str(), "jump");
        assert_eq!(serde_json::to_value(Control::Sneak).unwrap(), "sneak");
    }
}
