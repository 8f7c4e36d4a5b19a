//! Connection supervisor.
//!
//! Owns at most one live session and every timer. All inputs (session
//! events, console lines, due timers, shutdown) arrive through methods that
//! take the current instant, so the whole lifecycle runs without a clock.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use tokio::sync::mpsc;

use super::action::PendingAction;
use super::teardown::{TeardownReason, TeardownReport};
use super::timers::{TimerKind, Timers};
use super::{Flow, AUTH_BACKOFF_SECS, EXIT_EXHAUSTED, EXIT_OK, RECONNECT_DELAY_SECS, RESPAWN_DELAY_SECS};
use crate::auth::{AuthMode, Credentials};
use crate::chat::{kick_reason, ConsoleCommand, Decoder, Outbound, Wire};
use crate::config::{AutoActionConfig, ChatConfig, Config, LivenessConfig, ServerAddress};
use crate::console::{Console, StdoutConsole};
use crate::error::{FailureClass, Result, TetherError};
use crate::liveness::LivenessDriver;
use crate::notify::{NoopNotifier, Notifier};
use crate::protocol::{
    AttemptId, Candidate, ChatPayload, EventSink, GameSession, GameVersion, Negotiator,
    SessionEvent, SessionEventKind, SessionFactory, SessionOptions, VersionLadder,
    HANDSHAKE_TIMEOUT_SECS, LADDER_RESTART_SECS, MISMATCH_RETRY_SECS,
};
use crate::security::SafetyFilter;

const HELP: &[&str] = &[
    "Commands:",
    "  exit | quit | \\stop   disconnect and exit",
    "  status                show connection state",
    "  reconnect             drop the session and connect again",
    "  clear                 clear the screen",
    "  help                  show this help",
    "Anything else is sent as chat; lines starting with / are commands.",
];

/// Lifecycle of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing attempted yet.
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Logged in and spawned.
    Ready,
    /// Last session is gone; a reconnect is pending.
    Ended,
    /// Shut down or gave up. Nothing happens anymore.
    Terminal,
}

impl SessionState {
    /// Name for status output.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Ready => "ready",
            SessionState::Ended => "ended",
            SessionState::Terminal => "terminal",
        }
    }
}

/// Everything the supervisor needs from configuration.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Server to connect to.
    pub endpoint: ServerAddress,
    /// Versions to negotiate over.
    pub ladder: VersionLadder,
    /// Authentication mode handed to sessions.
    pub auth: AuthMode,
    /// Credentials fetched at startup.
    pub credentials: Option<Credentials>,
    /// Credential cache directory.
    pub profiles_folder: PathBuf,
    /// Keep-alive timeout.
    pub keep_alive: Duration,
    /// Anti-idle settings.
    pub liveness: LivenessConfig,
    /// Chat rendering and filtering.
    pub chat: ChatConfig,
    /// Command after a forced removal.
    pub auto_action: AutoActionConfig,
}

impl SupervisorConfig {
    /// Minimal configuration for `endpoint` with default settings.
    pub fn new(endpoint: ServerAddress, ladder: VersionLadder) -> Self {
        Self {
            endpoint,
            ladder,
            auth: AuthMode::default(),
            credentials: None,
            profiles_folder: PathBuf::new(),
            keep_alive: Duration::from_secs(crate::protocol::KEEP_ALIVE_SECS),
            liveness: LivenessConfig::default(),
            chat: ChatConfig::default(),
            auto_action: AutoActionConfig::default(),
        }
    }

    /// Derive from the full configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            endpoint: config.server.endpoint()?,
            ladder: config.server.ladder()?,
            auth: config.auth.mode,
            credentials: None,
            profiles_folder: config.auth.cache_dir(),
            keep_alive: config.server.keep_alive(),
            liveness: config.liveness.clone(),
            chat: config.chat.clone(),
            auto_action: config.auto_action.clone(),
        })
    }

    /// Attach startup credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

struct ActiveSession {
    attempt: AttemptId,
    version: GameVersion,
    handle: Box<dyn GameSession>,
}

/// Drives connection attempts, session events and console input.
pub struct Supervisor {
    config: SupervisorConfig,
    factory: Box<dyn SessionFactory>,
    events: mpsc::UnboundedSender<SessionEvent>,
    negotiator: Negotiator,
    liveness: LivenessDriver,
    decoder: Decoder,
    filter: SafetyFilter,
    action: PendingAction,
    console: Box<dyn Console>,
    notifier: Box<dyn Notifier>,
    timers: Timers,
    session: Option<ActiveSession>,
    state: SessionState,
    identity: Option<String>,
    next_attempt: u64,
    shutting_down: bool,
    last_teardown: Option<TeardownReport>,
    last_failure: Option<TetherError>,
}

impl Supervisor {
    /// Create a supervisor. Sessions publish their events on `events`.
    pub fn new(
        config: SupervisorConfig,
        factory: Box<dyn SessionFactory>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            negotiator: Negotiator::new(config.ladder.clone()),
            liveness: LivenessDriver::from_config(&config.liveness),
            decoder: Decoder::new(config.chat.colors),
            filter: SafetyFilter::from_config(&config.chat),
            action: PendingAction::from_config(&config.auto_action),
            config,
            factory,
            events,
            console: Box::new(StdoutConsole),
            notifier: Box::new(NoopNotifier),
            timers: Timers::new(),
            session: None,
            state: SessionState::Idle,
            identity: None,
            next_attempt: 0,
            shutting_down: false,
            last_teardown: None,
            last_failure: None,
        }
    }

    /// Use a different console.
    pub fn with_console(mut self, console: Box<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Use a notifier for connect and kick events.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Display name assigned at login.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Version negotiation position.
    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    /// Pending timers.
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Attempt id of the live session.
    pub fn attempt(&self) -> Option<AttemptId> {
        self.session.as_ref().map(|s| s.attempt)
    }

    /// Version of the live session.
    pub fn current_version(&self) -> Option<&GameVersion> {
        self.session.as_ref().map(|s| &s.version)
    }

    /// Whether a session is held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether shutdown has started.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Most recent teardown.
    pub fn last_teardown(&self) -> Option<&TeardownReport> {
        self.last_teardown.as_ref()
    }

    /// Most recent connection failure.
    pub fn last_failure(&self) -> Option<&TetherError> {
        self.last_failure.as_ref()
    }

    /// Queued auto action.
    pub fn pending_action(&self) -> &PendingAction {
        &self.action
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next().map(|(_, at)| at)
    }

    fn say(&mut self, text: &str) {
        self.console.line(text);
    }

    /// Print the startup banner.
    pub fn announce(&mut self) {
        let endpoint = self.config.endpoint.to_string();
        self.say(&format!("Server: {endpoint}"));
        let ladder = self.negotiator.ladder().clone();
        if ladder.len() == 1 {
            self.say(&format!("Version: {ladder}"));
        } else {
            self.say(&format!("Will try versions: {ladder}"));
            self.say("If every version fails, update the protocol bridge's dependencies.");
        }
        self.say("Type 'help' for commands.");
    }

    /// Start a connection attempt, replacing any live session.
    pub fn connect(&mut self, now: Instant) -> Flow {
        if self.shutting_down {
            return Flow::Continue;
        }

        self.timers.cancel(TimerKind::Reconnect);
        self.timers.cancel(TimerKind::HandshakeTimeout);
        self.timers.cancel(TimerKind::AutoAction);
        self.timers.cancel(TimerKind::Respawn);
        self.liveness.stop(&mut self.timers);
        self.teardown(TeardownReason::Superseded);

        match self.negotiator.next_candidate() {
            Candidate::Try(version) => self.start_attempt(version, now),
            Candidate::Restart { attempts } => {
                self.state = SessionState::Ended;
                tracing::warn!(attempts, "Version ladder exhausted, restarting");
                self.say(&format!(
                    "All versions failed, retrying the ladder in {LADDER_RESTART_SECS}s..."
                ));
                self.schedule_reconnect(now, Duration::from_secs(LADDER_RESTART_SECS));
                Flow::Continue
            },
            Candidate::Exhausted { attempts } => self.give_up(attempts),
        }
    }

    fn start_attempt(&mut self, version: GameVersion, now: Instant) -> Flow {
        self.next_attempt += 1;
        let attempt = AttemptId(self.next_attempt);
        self.identity = None;
        self.say(&format!(
            "[{}] Trying version {version}...",
            Local::now().format("%H:%M:%S")
        ));
        tracing::info!(%attempt, %version, endpoint = %self.config.endpoint, "Connecting");

        let options = self.session_options(&version);
        let sink = EventSink::new(attempt, self.events.clone());
        match self.factory.create(&options, sink) {
            Ok(handle) => {
                self.session = Some(ActiveSession {
                    attempt,
                    version,
                    handle,
                });
                self.state = SessionState::Connecting;
                self.timers.schedule(
                    TimerKind::HandshakeTimeout,
                    now + Duration::from_secs(HANDSHAKE_TIMEOUT_SECS),
                );
            },
            Err(e) => {
                tracing::warn!(%attempt, %version, "Session creation failed: {e}");
                self.say(&format!("Version {version} failed to start: {e}"));
                self.state = SessionState::Ended;
                // A backend that cannot start for this version is treated as a mismatch
                let delay = if e.class() == FailureClass::Auth {
                    AUTH_BACKOFF_SECS
                } else {
                    self.negotiator.advance();
                    MISMATCH_RETRY_SECS
                };
                self.schedule_reconnect(now, Duration::from_secs(delay));
                self.last_failure = Some(e);
            },
        }
        Flow::Continue
    }

    fn session_options(&self, version: &GameVersion) -> SessionOptions {
        let mut options = SessionOptions::new(
            self.config.endpoint.host.clone(),
            self.config.endpoint.port,
            version.clone(),
        );
        options.auth = self.config.auth;
        options.credentials = self.config.credentials.clone();
        options.profiles_folder = self.config.profiles_folder.clone();
        options.keep_alive = self.config.keep_alive;
        options
    }

    fn give_up(&mut self, attempts: u32) -> Flow {
        let err = TetherError::LadderExhausted { attempts };
        tracing::error!(attempts, "{err}");
        let ladder = self.negotiator.ladder().to_string();
        self.say(&format!("ERROR: {err}"));
        self.say(&format!("Tried: {ladder}"));
        self.say("The protocol bridge may be outdated, or the server runs an unsupported version.");
        self.say("Update the bridge's protocol dependencies or pin VERSION to the server's version.");
        self.shutting_down = true;
        self.timers.clear();
        self.state = SessionState::Terminal;
        self.last_failure = Some(err);
        Flow::Exit(EXIT_EXHAUSTED)
    }

    fn schedule_reconnect(&mut self, now: Instant, delay: Duration) {
        if self.shutting_down {
            return;
        }
        self.timers.schedule(TimerKind::Reconnect, now + delay);
    }

    /// Tear down the live session (if any) and keep the report.
    fn teardown(&mut self, reason: TeardownReason) {
        let Some(mut active) = self.session.take() else {
            return;
        };
        let mut report = TeardownReport::new(active.attempt, reason);
        if let Err(e) = active.handle.quit(reason.quit_message()) {
            report.errors.push(format!("quit: {e}"));
        }
        active.handle.detach();

        if report.is_clean() || reason == TeardownReason::Failed {
            tracing::debug!(attempt = %report.attempt, %reason, errors = ?report.errors, "Session torn down");
        } else {
            tracing::warn!(attempt = %report.attempt, %reason, errors = ?report.errors, "Session teardown reported errors");
        }
        self.last_teardown = Some(report);
    }

    /// The session failed: drop it and reconnect after `delay`.
    fn fail(&mut self, now: Instant, delay: Duration) {
        self.liveness.stop(&mut self.timers);
        self.timers.cancel(TimerKind::HandshakeTimeout);
        self.timers.cancel(TimerKind::AutoAction);
        self.timers.cancel(TimerKind::Respawn);
        self.teardown(TeardownReason::Failed);
        self.state = SessionState::Ended;
        self.schedule_reconnect(now, delay);
    }

    /// Process one session event.
    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) -> Flow {
        if self.shutting_down {
            tracing::trace!(event = event.kind.name(), "Event after shutdown ignored");
            return Flow::Continue;
        }
        if self.attempt() != Some(event.attempt) {
            tracing::debug!(attempt = %event.attempt, event = event.kind.name(), "Dropping event from stale session");
            return Flow::Continue;
        }

        match event.kind {
            SessionEventKind::Login { username } => {
                tracing::debug!(attempt = %event.attempt, user = %username, "Logged in");
                self.identity = Some(username);
            },
            SessionEventKind::Spawn => self.on_ready(now),
            SessionEventKind::Message(payload) => self.on_message(&payload),
            SessionEventKind::Kicked(reason) => self.on_kicked(&reason, now),
            SessionEventKind::Death => self.on_death(now),
            SessionEventKind::StreamError(message) | SessionEventKind::Error(message) => {
                let version = self
                    .current_version()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                self.on_failure(TetherError::from_session(version, &message), now);
            },
            SessionEventKind::End => self.on_end(now),
            SessionEventKind::AuthPrompt(code) => self.say(&code.prompt_line()),
        }
        Flow::Continue
    }

    /// Spawn makes a session ready; repeats are ignored.
    fn on_ready(&mut self, now: Instant) {
        if self.state != SessionState::Connecting {
            return;
        }
        self.state = SessionState::Ready;
        self.timers.cancel(TimerKind::HandshakeTimeout);
        self.negotiator.reset();

        let version = self
            .current_version()
            .map(ToString::to_string)
            .unwrap_or_default();
        let name = self
            .identity
            .clone()
            .or_else(|| self.config.credentials.as_ref().map(|c| c.profile.name.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(attempt = ?self.attempt(), %version, user = %name, "Session ready");
        self.say(&format!("Version {version} - login successful"));
        self.say(&format!("Connected as {name}"));
        self.say("READY - type messages and press Enter, \\stop to quit");
        self.notifier.notify(&format!(
            "Connected to {} as {name} ({version})",
            self.config.endpoint
        ));

        if self.action.is_armed() {
            self.timers
                .schedule(TimerKind::AutoAction, now + self.action.delay());
        }
        self.liveness.start(&mut self.timers, now);
    }

    fn on_message(&mut self, payload: &ChatPayload) {
        if self.state != SessionState::Ready {
            return;
        }
        if let Some(line) = self.decoder.decode(payload) {
            self.say(&line);
        }
    }

    fn on_kicked(&mut self, reason: &serde_json::Value, now: Instant) {
        let reason = kick_reason(reason);
        tracing::warn!(attempt = ?self.attempt(), "Kicked: {reason}");
        self.say(&format!("Kicked: {reason}"));
        self.notifier
            .notify(&format!("Kicked from {}: {reason}", self.config.endpoint));
        self.action.arm();
        self.fail(now, Duration::from_secs(RECONNECT_DELAY_SECS));
        self.say(&format!("Reconnecting in {RECONNECT_DELAY_SECS}s..."));
    }

    fn on_end(&mut self, now: Instant) {
        tracing::info!(attempt = ?self.attempt(), "Session ended");
        self.say(&format!("Disconnected - reconnecting in {RECONNECT_DELAY_SECS}s..."));
        self.fail(now, Duration::from_secs(RECONNECT_DELAY_SECS));
    }

    /// Route a session failure by its class.
    fn on_failure(&mut self, err: TetherError, now: Instant) {
        let class = match err.class() {
            // Framing errors after the handshake are not a version problem
            FailureClass::VersionMismatch if self.state != SessionState::Connecting => {
                FailureClass::Transient
            },
            class => class,
        };
        match class {
            FailureClass::Ignorable => {
                tracing::debug!("Ignoring {err}");
                return;
            },
            FailureClass::VersionMismatch => {
                tracing::warn!(attempt = ?self.attempt(), "{err}");
                let line = match &err {
                    TetherError::VersionMismatch { version, .. } => {
                        format!("Version {version} failed - protocol mismatch")
                    },
                    other => other.to_string(),
                };
                self.say(&line);
                self.negotiator.advance();
                self.fail(now, Duration::from_secs(MISMATCH_RETRY_SECS));
            },
            FailureClass::Auth => {
                tracing::error!(attempt = ?self.attempt(), "{err}");
                self.say(&err.to_string());
                self.say(&format!("Retrying in {AUTH_BACKOFF_SECS}s..."));
                self.fail(now, Duration::from_secs(AUTH_BACKOFF_SECS));
            },
            FailureClass::Transient => {
                tracing::warn!(attempt = ?self.attempt(), "{err}");
                self.say(&err.to_string());
                self.say(&format!("Reconnecting in {RECONNECT_DELAY_SECS}s..."));
                self.fail(now, Duration::from_secs(RECONNECT_DELAY_SECS));
            },
        }
        self.last_failure = Some(err);
    }

    fn on_handshake_timeout(&mut self, now: Instant) {
        if self.state != SessionState::Connecting {
            return;
        }
        let version = self
            .current_version()
            .map(ToString::to_string)
            .unwrap_or_default();
        self.on_failure(
            TetherError::HandshakeTimeout {
                version,
                secs: HANDSHAKE_TIMEOUT_SECS,
            },
            now,
        );
    }

    fn on_death(&mut self, now: Instant) {
        if self.state != SessionState::Ready {
            return;
        }
        self.say(&format!("Died - respawning in {RESPAWN_DELAY_SECS}s..."));
        self.timers
            .schedule(TimerKind::Respawn, now + Duration::from_secs(RESPAWN_DELAY_SECS));
    }

    fn respawn(&mut self, now: Instant) {
        let Some(active) = self.session.as_mut() else {
            return;
        };
        if let Err(e) = active.handle.respawn() {
            tracing::warn!("Respawn failed: {e}");
            self.say(&format!("Respawn failed - reconnecting in {RECONNECT_DELAY_SECS}s..."));
            self.fail(now, Duration::from_secs(RECONNECT_DELAY_SECS));
        }
    }

    /// Fire every timer due at `now`, earliest first.
    pub fn fire_due(&mut self, now: Instant) -> Flow {
        while let Some(kind) = self.timers.pop_due(now) {
            tracing::trace!(timer = kind.name(), "Timer fired");
            if let Flow::Exit(code) = self.fire(kind, now) {
                return Flow::Exit(code);
            }
        }
        Flow::Continue
    }

    fn fire(&mut self, kind: TimerKind, now: Instant) -> Flow {
        match kind {
            TimerKind::Reconnect => return self.connect(now),
            TimerKind::HandshakeTimeout => self.on_handshake_timeout(now),
            TimerKind::LivenessTick => match self.session.as_mut() {
                Some(active) if self.state == SessionState::Ready => {
                    self.liveness
                        .tick(active.handle.as_mut(), &mut self.timers, now);
                },
                _ => self.liveness.stop(&mut self.timers),
            },
            TimerKind::LivenessRelease => {
                if let Some(active) = self.session.as_mut() {
                    self.liveness.release(active.handle.as_mut());
                }
            },
            TimerKind::AutoAction => self.run_auto_action(),
            TimerKind::Respawn => self.respawn(now),
        }
        Flow::Continue
    }

    fn run_auto_action(&mut self) {
        if self.state != SessionState::Ready {
            return;
        }
        let Some(command) = self.action.take() else {
            return;
        };
        self.say(&format!("Auto action: /{command}"));
        if let Err(e) = self.dispatch(&Outbound::Command(command)) {
            tracing::warn!("Auto action failed: {e}");
        }
    }

    /// Encode and hand a message to the live session.
    fn dispatch(&mut self, outbound: &Outbound) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(TetherError::SessionClosed);
        }
        let Some(active) = self.session.as_mut() else {
            return Err(TetherError::SessionClosed);
        };
        match outbound.encode(&active.version, Utc::now()) {
            Wire::Chat(text) => active.handle.chat(&text),
            Wire::Packet { name, payload } => active.handle.write(name, payload),
        }
    }

    fn send(&mut self, outbound: Outbound) {
        let text = outbound.text();
        if let Err(e) = self.filter.enforce(&text) {
            self.say(&format!("[Blocked] {e}"));
            return;
        }
        if self.state != SessionState::Ready {
            self.say("Not connected yet");
            return;
        }
        match self.dispatch(&outbound) {
            Ok(()) => self.say(&format!("> {text}")),
            Err(e) => {
                tracing::warn!("Send failed: {e}");
                self.say(&format!("Failed to send: {e}"));
            },
        }
    }

    /// Process one console line.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Flow {
        if self.shutting_down {
            return Flow::Continue;
        }
        match ConsoleCommand::parse(line) {
            ConsoleCommand::Exit => return self.shutdown(),
            ConsoleCommand::Help => {
                for line in HELP {
                    self.say(line);
                }
            },
            ConsoleCommand::Status => {
                let status = self.status_line();
                self.say(&status);
            },
            ConsoleCommand::Reconnect => {
                self.say("Reconnecting...");
                return self.connect(now);
            },
            ConsoleCommand::Clear => self.console.clear(),
            ConsoleCommand::Send(outbound) => self.send(outbound),
        }
        Flow::Continue
    }

    /// One-line summary of the connection.
    pub fn status_line(&self) -> String {
        let version = self
            .current_version()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "State: {} | Server: {} | Version: {} | User: {} | Ladder: {}/{} | Restarts: {}",
            self.state.name(),
            self.config.endpoint,
            version,
            self.identity.as_deref().unwrap_or("-"),
            self.negotiator.index() + 1,
            self.negotiator.ladder().len(),
            self.negotiator.attempts(),
        )
    }

    /// Stop everything. Only the first call does any work; it returns the
    /// exit flow, later calls return [`Flow::Continue`].
    pub fn shutdown(&mut self) -> Flow {
        if self.shutting_down {
            tracing::debug!("Shutdown already in progress");
            return Flow::Continue;
        }
        self.shutting_down = true;
        self.say("Shutting down...");
        self.liveness.stop(&mut self.timers);
        self.timers.clear();
        self.teardown(TeardownReason::Shutdown);
        self.state = SessionState::Terminal;
        tracing::info!("Shutdown complete");
        Flow::Exit(EXIT_OK)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("state", &self.state)
            .field("attempt", &self.attempt())
            .field("identity", &self.identity)
            .field("negotiator", &self.negotiator)
            .field("timers", &self.timers)
            .field("shutting_down", &self.shutting_down)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoSessions;

    impl SessionFactory for NoSessions {
        fn create(&mut self, _options: &SessionOptions, _sink: EventSink) -> Result<Box<dyn GameSession>> {
            Err(TetherError::Session("unavailable".into()))
        }
    }

    struct Quiet;

    impl Console for Quiet {
        fn line(&mut self, _text: &str) {}
        fn clear(&mut self) {}
    }

    #[test]
    fn test_config_from_full_config() {
        let mut config = Config::default();
        config.server.address = "mc.example.org:25570".to_string();
        config.server.version = Some("1.20.4".parse().unwrap());
        config.liveness.enabled = false;

        let sup = SupervisorConfig::from_config(&config).unwrap();
        assert_eq!(sup.endpoint.port, 25570);
        assert_eq!(sup.ladder.len(), 1);
        assert!(!sup.liveness.enabled);
        assert!(sup.credentials.is_none());
    }

    #[test]
    fn test_status_before_connect() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = SupervisorConfig::new("localhost".parse().unwrap(), VersionLadder::default());
        let sup = Supervisor::new(config, Box::new(NoSessions), tx).with_console(Box::new(Quiet));

        assert_eq!(sup.state(), SessionState::Idle);
        assert_eq!(
            sup.status_line(),
            "State: idle | Server: localhost:25565 | Version: - | User: - | Ladder: 1/8 | Restarts: 0"
        );
        assert_eq!(sup.next_deadline(), None);
    }

    #[test]
    fn test_session_options_carry_settings() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut config = SupervisorConfig::new("localhost:25566".parse().unwrap(), VersionLadder::default());
        config.auth = AuthMode::Offline;
        config.keep_alive = Duration::from_secs(30);
        let sup = Supervisor::new(config, Box::new(NoSessions), tx).with_console(Box::new(Quiet));

        let options = sup.session_options(&"1.21".parse().unwrap());
        assert_eq!(options.host, "localhost");
        assert_eq!(options.port, 25566);
        assert_eq!(options.auth, AuthMode::Offline);
        assert_eq!(options.keep_alive, Duration::from_secs(30));
        assert_eq!(options.view_distance, "tiny");
    }
}
