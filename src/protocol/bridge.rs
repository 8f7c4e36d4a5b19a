//! JSON-lines bridge backend.
//!
//! Runs a protocol implementation as a child process and talks to it over
//! stdio, one JSON object per line:
//!
//! ```text
//!   tether                                 bridge process
//!     |--- {"op":"connect", ...options} --->|
//!     |<-- {"event":"login","username":..} -|
//!     |<-- {"event":"spawn"} ---------------|
//!     |--- {"op":"chat","text":"hi"} ------>|
//!     |<-- {"event":"message","json":..} ---|
//!     |--- {"op":"quit","reason":..} ------>|
//!     |<-- EOF (reported as "end") ---------|
//! ```
//!
//! Lines that do not parse as an event are logged and skipped.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::message::{ChatPayload, EventSink, SessionEventKind};
use super::session::{Control, GameSession, SessionFactory, SessionOptions};
use crate::auth::DeviceCode;
use crate::error::{Result, TetherError};

/// How long a quitting bridge gets to exit on its own.
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// Commands sent to the bridge.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeCommand {
    Connect(SessionOptions),
    Chat { text: String },
    Control { control: Control, state: bool },
    Respawn,
    Quit { reason: Option<String> },
    Write { packet: String, payload: Value },
}

/// Events read from the bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum BridgeEvent {
    Login {
        username: String,
    },
    Spawn,
    Message {
        json: Value,
        #[serde(default)]
        plain: Option<String>,
    },
    Kicked {
        #[serde(default)]
        reason: Value,
    },
    Death,
    ClientError {
        message: String,
    },
    Error {
        message: String,
    },
    End,
    AuthPrompt {
        verification_uri: String,
        user_code: String,
    },
}

impl From<BridgeEvent> for SessionEventKind {
    fn from(event: BridgeEvent) -> Self {
        match event {
            BridgeEvent::Login { username } => SessionEventKind::Login { username },
            BridgeEvent::Spawn => SessionEventKind::Spawn,
            BridgeEvent::Message { json, plain } => {
                SessionEventKind::Message(ChatPayload { json, plain })
            },
            BridgeEvent::Kicked { reason } => SessionEventKind::Kicked(reason),
            BridgeEvent::Death => SessionEventKind::Death,
            BridgeEvent::ClientError { message } => SessionEventKind::StreamError(message),
            BridgeEvent::Error { message } => SessionEventKind::Error(message),
            BridgeEvent::End => SessionEventKind::End,
            BridgeEvent::AuthPrompt {
                verification_uri,
                user_code,
            } => SessionEventKind::AuthPrompt(DeviceCode {
                verification_uri,
                user_code,
            }),
        }
    }
}

/// Spawns one bridge process per connection attempt.
#[derive(Debug, Clone)]
pub struct BridgeFactory {
    program: String,
    args: Vec<String>,
}

impl BridgeFactory {
    /// Bridge launched as `program args...`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl SessionFactory for BridgeFactory {
    fn create(&mut self, options: &SessionOptions, sink: EventSink) -> Result<Box<dyn GameSession>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TetherError::Session(format!("Failed to start bridge {}: {e}", self.program))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TetherError::Session("Bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TetherError::Session("Bridge stdout unavailable".to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        cmd_tx
            .send(BridgeCommand::Connect(options.clone()))
            .map_err(|_| TetherError::SessionClosed)?;

        let entity = Arc::new(AtomicBool::new(false));
        tracing::debug!(attempt = %sink.attempt(), program = %self.program, "bridge started");

        let writer = tokio::spawn(write_commands(stdin, cmd_rx));
        let reader = tokio::spawn(read_events(stdout, sink, Arc::clone(&entity)));

        Ok(Box::new(BridgeSession {
            child: Some(child),
            cmd_tx,
            reader,
            writer: Some(writer),
            entity,
        }))
    }
}

/// Session backed by a bridge process.
#[derive(Debug)]
pub struct BridgeSession {
    child: Option<Child>,
    cmd_tx: mpsc::UnboundedSender<BridgeCommand>,
    reader: JoinHandle<()>,
    writer: Option<JoinHandle<()>>,
    entity: Arc<AtomicBool>,
}

impl BridgeSession {
    fn send(&self, command: BridgeCommand) -> Result<()> {
        self.cmd_tx
            .send(command)
            .map_err(|_| TetherError::SessionClosed)
    }
}

impl GameSession for BridgeSession {
    fn has_entity(&self) -> bool {
        self.entity.load(Ordering::SeqCst)
    }

    fn chat(&mut self, text: &str) -> Result<()> {
        self.send(BridgeCommand::Chat {
            text: text.to_string(),
        })
    }

    fn set_control_state(&mut self, control: Control, state: bool) -> Result<()> {
        self.send(BridgeCommand::Control { control, state })
    }

    fn respawn(&mut self) -> Result<()> {
        self.send(BridgeCommand::Respawn)
    }

    fn quit(&mut self, reason: Option<&str>) -> Result<()> {
        self.send(BridgeCommand::Quit {
            reason: reason.map(str::to_string),
        })
    }

    fn write(&mut self, packet: &str, payload: Value) -> Result<()> {
        self.send(BridgeCommand::Write {
            packet: packet.to_string(),
            payload,
        })
    }

    fn detach(&mut self) {
        self.reader.abort();
        self.entity.store(false, Ordering::SeqCst);

        // Give the writer a moment to flush a pending quit, then reap.
        let (Some(mut child), Ok(handle)) =
            (self.child.take(), tokio::runtime::Handle::try_current())
        else {
            return;
        };
        let writer = self.writer.take();
        handle.spawn(async move {
            if tokio::time::timeout(EXIT_GRACE, child.wait()).await.is_err() {
                let _ = child.kill().await;
            }
            if let Some(writer) = writer {
                writer.abort();
            }
        });
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn write_commands(mut stdin: ChildStdin, mut rx: mpsc::UnboundedReceiver<BridgeCommand>) {
    while let Some(command) = rx.recv().await {
        let mut line = match serde_json::to_string(&command) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to encode bridge command: {e}");
                continue;
            },
        };
        line.push('\n');
        if let Err(e) = stdin.write_all(line.as_bytes()).await {
            tracing::debug!("Bridge stdin closed: {e}");
            break;
        }
        let _ = stdin.flush().await;
    }
}

async fn read_events(stdout: ChildStdout, sink: EventSink, entity: Arc<AtomicBool>) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let event = match serde_json::from_str::<BridgeEvent>(line) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(attempt = %sink.attempt(), "Skipping bridge line: {e}");
                        continue;
                    },
                };
                match event {
                    BridgeEvent::Spawn => entity.store(true, Ordering::SeqCst),
                    BridgeEvent::Death | BridgeEvent::End => entity.store(false, Ordering::SeqCst),
                    _ => {},
                }
                let kind = SessionEventKind::from(event);
                let ended = kind == SessionEventKind::End;
                if !sink.emit(kind) || ended {
                    return;
                }
            },
            Ok(None) => break,
            Err(e) => {
                sink.emit(SessionEventKind::StreamError(e.to_string()));
                break;
            },
        }
    }
    entity.store(false, Ordering::SeqCst);
    sink.emit(SessionEventKind::End);
}
