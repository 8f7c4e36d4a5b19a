//! Console input classification and outbound chat encoding.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::protocol::GameVersion;

/// Size of the acknowledged-messages bitset (20 bits).
const ACK_BYTES: usize = 3;

/// A line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `exit`, `quit` or `\stop`.
    Exit,
    /// `help`.
    Help,
    /// `status`.
    Status,
    /// `reconnect`.
    Reconnect,
    /// `clear`.
    Clear,
    /// Anything else goes to the server.
    Send(Outbound),
}

impl ConsoleCommand {
    /// Classify one input line. Control words are matched case-insensitively
    /// against the trimmed line.
    pub fn parse(line: &str) -> Self {
        let text = line.trim();
        match text.to_ascii_lowercase().as_str() {
            "exit" | "quit" | "\\stop" => ConsoleCommand::Exit,
            "help" => ConsoleCommand::Help,
            "status" => ConsoleCommand::Status,
            "reconnect" => ConsoleCommand::Reconnect,
            "clear" => ConsoleCommand::Clear,
            _ => ConsoleCommand::Send(Outbound::classify(text)),
        }
    }
}

/// Outbound text: plain chat or a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Plain chat.
    Chat(String),
    /// Command, stored without the leading slash.
    Command(String),
}

impl Outbound {
    /// Lines starting with `/` are commands.
    pub fn classify(text: &str) -> Self {
        match text.strip_prefix('/') {
            Some(command) => Outbound::Command(command.to_string()),
            None => Outbound::Chat(text.to_string()),
        }
    }

    /// Text as the user typed it.
    pub fn text(&self) -> String {
        match self {
            Outbound::Chat(text) => text.clone(),
            Outbound::Command(command) => format!("/{command}"),
        }
    }

    /// Encode for the wire.
    ///
    /// Versions with signed chat need explicit packets carrying a timestamp,
    /// a salt and empty signatures; older versions take plain chat.
    pub fn encode(&self, version: &GameVersion, now: DateTime<Utc>) -> Wire {
        if !version.requires_signed_chat() {
            return Wire::Chat(self.text());
        }
        let timestamp = now.timestamp_millis();
        let acknowledged = vec![0u8; ACK_BYTES];
        match self {
            Outbound::Chat(message) => Wire::Packet {
                name: "chat_message",
                payload: json!({
                    "message": message,
                    "timestamp": timestamp,
                    "salt": 0,
                    "signature": Value::Null,
                    "offset": 0,
                    "acknowledged": acknowledged,
                }),
            },
            Outbound::Command(command) => Wire::Packet {
                name: "chat_command",
                payload: json!({
                    "command": command,
                    "timestamp": timestamp,
                    "salt": 0,
                    "argumentSignatures": [],
                    "messageCount": 0,
                    "acknowledged": acknowledged,
                }),
            },
        }
    }
}

/// Encoded outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Wire {
    /// Hand to the session's plain chat call.
    Chat(String),
    /// Write as a raw packet.
    Packet {
        /// Packet name.
        name: &'static str,
        /// Packet fields.
        payload: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_control_words() {
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Exit);
        assert_eq!(ConsoleCommand::parse("  QUIT "), ConsoleCommand::Exit);
        assert_eq!(ConsoleCommand::parse("\\stop"), ConsoleCommand::Exit);
        assert_eq!(ConsoleCommand::parse("Help"), ConsoleCommand::Help);
        assert_eq!(ConsoleCommand::parse("status"), ConsoleCommand::Status);
        assert_eq!(ConsoleCommand::parse("reconnect"), ConsoleCommand::Reconnect);
        assert_eq!(ConsoleCommand::parse("CLEAR"), ConsoleCommand::Clear);
    }

    #[test]
    fn test_send_classification() {
        assert_eq!(
            ConsoleCommand::parse("hello everyone"),
            ConsoleCommand::Send(Outbound::Chat("hello everyone".into()))
        );
        assert_eq!(
            ConsoleCommand::parse("/tpa Steve"),
            ConsoleCommand::Send(Outbound::Command("tpa Steve".into()))
        );
        // Control words only match the whole line
        assert_eq!(
            ConsoleCommand::parse("exit now"),
            ConsoleCommand::Send(Outbound::Chat("exit now".into()))
        );
    }

    #[test]
    fn test_outbound_text_keeps_slash() {
        assert_eq!(Outbound::classify("/spawn").text(), "/spawn");
        assert_eq!(Outbound::classify("hi").text(), "hi");
    }

    #[test]
    fn test_legacy_versions_use_plain_chat() {
        let version: GameVersion = "1.18.2".parse().unwrap();
        assert_eq!(
            Outbound::classify("/spawn").encode(&version, at(0)),
            Wire::Chat("/spawn".into())
        );
    }

    #[test]
    fn test_signed_chat_packet() {
        let version: GameVersion = "1.20.4".parse().unwrap();
        let Wire::Packet { name, payload } = Outbound::classify("hello").encode(&version, at(1_700_000_000_000)) else {
            panic!("expected packet");
        };
        assert_eq!(name, "chat_message");
        assert_eq!(payload["message"], "hello");
        assert_eq!(payload["timestamp"], 1_700_000_000_000_i64);
        assert_eq!(payload["salt"], 0);
        assert!(payload["signature"].is_null());
    }

    #[test]
    fn test_signed_command_packet() {
        let version: GameVersion = "1.19".parse().unwrap();
        let Wire::Packet { name, payload } = Outbound::classify("/tpa Alex").encode(&version, at(5)) else {
            panic!("expected packet");
        };
        assert_eq!(name, "chat_command");
        assert_eq!(payload["command"], "tpa Alex");
        assert_eq!(payload["argumentSignatures"], json!([]));
    }
}
