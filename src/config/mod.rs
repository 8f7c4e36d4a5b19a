//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (including a `.env` file loaded by the binary)
//! - CLI arguments (applied by the binary on top)
//!
//! Precedence is file < environment < CLI.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::AuthMode;
use crate::error::{Result, TetherError};
use crate::protocol::{GameVersion, VersionLadder, DEFAULT_LADDER, DEFAULT_PORT, KEEP_ALIVE_SECS};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server endpoint and versions
    #[serde(default)]
    pub server: ServerConfig,

    /// Anti-idle action
    #[serde(default)]
    pub liveness: LivenessConfig,

    /// Chat rendering and outbound filter
    #[serde(default)]
    pub chat: ChatConfig,

    /// Webhook notifications
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Command run after a respawn that followed a kick
    #[serde(default)]
    pub auto_action: AutoActionConfig,

    /// Account and credential cache
    #[serde(default)]
    pub auth: AuthConfig,

    /// Protocol bridge process
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| TetherError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| TetherError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().merge(ConfigOverlay::from_env())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().merge(ConfigOverlay::from_lookup(lookup))
    }

    /// Load the file (if any) and overlay the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.merge(ConfigOverlay::from_env()))
    }

    /// Apply every setting present in `overlay`, whatever its value.
    pub fn merge(mut self, overlay: ConfigOverlay) -> Self {
        if let Some(address) = overlay.address {
            self.server.address = address;
        }
        if let Some(version) = overlay.version {
            self.server.version = Some(version);
        }
        if let Some(versions) = overlay.versions {
            self.server.versions = versions;
        }
        if let Some(enabled) = overlay.liveness_enabled {
            self.liveness.enabled = enabled;
        }
        if let Some(secs) = overlay.liveness_interval_secs {
            self.liveness.interval_secs = secs;
        }
        if let Some(colors) = overlay.chat_colors {
            self.chat.colors = colors;
        }
        if let Some(url) = overlay.webhook_url {
            self.webhook.url = Some(url);
        }
        if let Some(username) = overlay.webhook_username {
            self.webhook.username = username;
        }
        if let Some(command) = overlay.auto_action_command {
            self.auto_action.command = Some(command);
        }
        if let Some(secs) = overlay.auto_action_delay_secs {
            self.auto_action.delay_secs = secs;
        }
        if let Some(account) = overlay.account {
            self.auth.account = account;
        }
        if let Some(mode) = overlay.auth_mode {
            self.auth.mode = mode;
        }
        if let Some(dir) = overlay.cache_dir {
            self.auth.cache_dir = Some(dir);
        }
        if let Some(bridge) = overlay.bridge {
            self.bridge = bridge;
        }
        self
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        self.server.endpoint()?;
        self.server.ladder()?;
        if self.liveness.enabled && self.liveness.interval_secs == 0 {
            return Err(TetherError::Config(
                "liveness.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.chat.max_length == 0 {
            return Err(TetherError::Config(
                "chat.max_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings found in the environment.
///
/// `None` means the variable was not set, so the layer below keeps its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverlay {
    /// `TETHER_SERVER` / `IP`
    pub address: Option<String>,
    /// `VERSION`
    pub version: Option<GameVersion>,
    /// `TETHER_VERSIONS`
    pub versions: Option<Vec<GameVersion>>,
    /// `ENABLE_JUMP`
    pub liveness_enabled: Option<bool>,
    /// `JUMP_INTERVAL`
    pub liveness_interval_secs: Option<u64>,
    /// `CHAT_COLORS`
    pub chat_colors: Option<bool>,
    /// `DISCORD_WEBHOOK`
    pub webhook_url: Option<String>,
    /// `WEBHOOK_USERNAME`
    pub webhook_username: Option<String>,
    /// `AUTO_TP_COMMAND`
    pub auto_action_command: Option<String>,
    /// `AUTO_TP_DELAY`
    pub auto_action_delay_secs: Option<u64>,
    /// `ACCOUNT`
    pub account: Option<String>,
    /// `AUTH_MODE`
    pub auth_mode: Option<AuthMode>,
    /// `AUTH_CACHE_DIR`
    pub cache_dir: Option<PathBuf>,
    /// `TETHER_BRIDGE`
    pub bridge: Option<BridgeConfig>,
}

impl ConfigOverlay {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary variable lookup. Blank and unparsable values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let version = get("VERSION").and_then(|v| match v.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring VERSION: {e}");
                None
            },
        });
        let versions = get("TETHER_VERSIONS").and_then(|list| match VersionLadder::parse_list(&list) {
            Ok(ladder) => Some(ladder.iter().cloned().collect()),
            Err(e) => {
                tracing::warn!("Ignoring TETHER_VERSIONS: {e}");
                None
            },
        });
        let auth_mode = get("AUTH_MODE").and_then(|mode| match mode.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                tracing::warn!("Ignoring AUTH_MODE: {e}");
                None
            },
        });
        let bridge = get("TETHER_BRIDGE").map(|command| {
            let mut parts = command.split_whitespace().map(str::to_string);
            BridgeConfig {
                program: parts.next(),
                args: parts.collect(),
            }
        });

        Self {
            address: get("TETHER_SERVER").or_else(|| get("IP")),
            version,
            versions,
            liveness_enabled: get("ENABLE_JUMP").and_then(|v| parse_flag(&v)),
            liveness_interval_secs: get("JUMP_INTERVAL").and_then(|v| v.parse().ok()),
            chat_colors: get("CHAT_COLORS").and_then(|v| parse_flag(&v)),
            webhook_url: get("DISCORD_WEBHOOK"),
            webhook_username: get("WEBHOOK_USERNAME"),
            auto_action_command: get("AUTO_TP_COMMAND"),
            auto_action_delay_secs: get("AUTO_TP_DELAY").and_then(|v| v.parse().ok()),
            account: get("ACCOUNT"),
            auth_mode,
            cache_dir: get("AUTH_CACHE_DIR").map(PathBuf::from),
            bridge,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Host name or IP.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl FromStr for ServerAddress {
    type Err = TetherError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |why: &str| TetherError::Config(format!("Invalid server address {s:?}: {why}"));

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("unclosed '['"))?;
            (host, tail.strip_prefix(':'))
        } else {
            match s.rsplit_once(':') {
                Some((host, port)) if !host.contains(':') => (host, Some(port)),
                Some(_) => (s, None),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        let port = match port {
            Some(p) => p.parse().map_err(|_| invalid("bad port"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host[:port]`
    pub address: String,

    /// Pinned version; overrides the ladder
    pub version: Option<GameVersion>,

    /// Fallback ladder, newest first
    pub versions: Vec<GameVersion>,

    /// Keep-alive timeout in seconds
    pub keep_alive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: format!("localhost:{DEFAULT_PORT}"),
            version: None,
            versions: DEFAULT_LADDER.iter().filter_map(|v| v.parse().ok()).collect(),
            keep_alive_secs: KEEP_ALIVE_SECS,
        }
    }
}

impl ServerConfig {
    /// Parsed endpoint.
    pub fn endpoint(&self) -> Result<ServerAddress> {
        self.address.parse()
    }

    /// Ladder to negotiate over.
    pub fn ladder(&self) -> Result<VersionLadder> {
        match &self.version {
            Some(v) => Ok(VersionLadder::pinned(v.clone())),
            None => VersionLadder::new(self.versions.clone()),
        }
    }

    /// Keep-alive timeout.
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Anti-idle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Jump periodically while ready
    pub enabled: bool,

    /// Seconds between jumps
    pub interval_secs: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl LivenessConfig {
    /// Interval between actions.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Chat configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Render formatting codes as ANSI colors instead of stripping them
    pub colors: bool,

    /// Substrings that block an outbound message
    pub forbidden: Vec<String>,

    /// Maximum outbound message length (characters)
    pub max_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            colors: false,
            forbidden: vec!["$".to_string()],
            max_length: 256,
        }
    }
}

/// Webhook configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Discord-style webhook URL; notifications are off when unset
    pub url: Option<String>,

    /// Display name for posted messages
    pub username: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: "tether".to_string(),
        }
    }
}

/// Auto action configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoActionConfig {
    /// Command to run (e.g. `/tpa owner`)
    pub command: Option<String>,

    /// Seconds to wait after the ready transition
    pub delay_secs: u64,
}

impl Default for AutoActionConfig {
    fn default() -> Self {
        Self {
            command: None,
            delay_secs: 5,
        }
    }
}

impl AutoActionConfig {
    /// Delay before firing.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Auth configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Account identifier (email for Microsoft, player name offline)
    pub account: String,

    /// Authentication mode
    pub mode: AuthMode,

    /// Credential cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            account: "tether".to_string(),
            mode: AuthMode::default(),
            cache_dir: None,
        }
    }
}

impl AuthConfig {
    /// Configured cache directory, or the platform cache location.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|p| p.join("tether").join("auth"))
                .unwrap_or_else(|| PathBuf::from(".auth_cache"))
        })
    }
}

/// Bridge process configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Program implementing the JSON-lines session protocol
    pub program: Option<String>,

    /// Arguments passed to the program
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.address, "localhost:25565");
        assert_eq!(config.server.ladder().unwrap().len(), 8);
        assert!(config.liveness.enabled);
        assert_eq!(config.liveness.interval_secs, 60);
        assert_eq!(config.chat.max_length, 256);
        assert_eq!(config.chat.forbidden, vec!["$".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_address_parsing() {
        let addr: ServerAddress = "play.example.net:25570".parse().unwrap();
        assert_eq!(addr.host, "play.example.net");
        assert_eq!(addr.port, 25570);

        let addr: ServerAddress = "play.example.net".parse().unwrap();
        assert_eq!(addr.port, 25565);

        let addr: ServerAddress = "[::1]:25566".parse().unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.to_string(), "[::1]:25566");

        assert!("host:notaport".parse::<ServerAddress>().is_err());
        assert!(":25565".parse::<ServerAddress>().is_err());
    }

    #[test]
    fn test_pinned_version_is_single_ladder() {
        let mut config = Config::default();
        config.server.version = Some("1.21.8".parse().unwrap());
        let ladder = config.server.ladder().unwrap();
        assert_eq!(ladder.len(), 1);
        assert_eq!(ladder.get(0).unwrap().to_string(), "1.21.8");
    }

    #[test]
    fn test_config_from_env() {
        let config = Config::from_lookup(env(&[
            ("IP", "gravijet.net:25565"),
            ("VERSION", "1.21.8"),
            ("ENABLE_JUMP", "0"),
            ("JUMP_INTERVAL", "30"),
            ("DISCORD_WEBHOOK", "https://discord.com/api/webhooks/1/x"),
            ("AUTO_TP_COMMAND", "/tpa owner"),
            ("AUTH_MODE", "offline"),
            ("TETHER_BRIDGE", "node bridge.js --quiet"),
        ]));

        assert_eq!(config.server.address, "gravijet.net:25565");
        assert_eq!(config.server.version.unwrap().to_string(), "1.21.8");
        assert!(!config.liveness.enabled);
        assert_eq!(config.liveness.interval_secs, 30);
        assert!(config.webhook.url.is_some());
        assert_eq!(config.auto_action.command.as_deref(), Some("/tpa owner"));
        assert_eq!(config.auth.mode, AuthMode::Offline);
        assert_eq!(config.bridge.program.as_deref(), Some("node"));
        assert_eq!(config.bridge.args, vec!["bridge.js", "--quiet"]);
    }

    #[test]
    fn test_env_ignores_bad_values() {
        let config = Config::from_lookup(env(&[
            ("VERSION", "latest"),
            ("ENABLE_JUMP", "maybe"),
            ("JUMP_INTERVAL", "soon"),
        ]));
        assert!(config.server.version.is_none());
        assert!(config.liveness.enabled);
        assert_eq!(config.liveness.interval_secs, 60);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [server]
            address = "mc.example.org"
            versions = ["1.21.4", "1.20.1"]

            [liveness]
            interval_secs = 45

            [chat]
            forbidden = ["$", "${"]
            max_length = 100

            [auto_action]
            command = "/home"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.endpoint().unwrap().port, 25565);
        assert_eq!(config.server.ladder().unwrap().len(), 2);
        assert_eq!(config.liveness.interval_secs, 45);
        assert!(config.liveness.enabled);
        assert_eq!(config.chat.max_length, 100);
        assert_eq!(config.auto_action.delay_secs, 5);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.toml");
        std::fs::write(&path, "[server]\naddress = \"a.example:1\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.address, "a.example:1");

        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let mut file = Config::default();
        file.server.address = "file.example".to_string();
        file.liveness.interval_secs = 90;
        file.webhook.url = Some("https://file".to_string());

        let merged = file.merge(ConfigOverlay::from_lookup(env(&[("IP", "env.example")])));
        assert_eq!(merged.server.address, "env.example");
        assert_eq!(merged.liveness.interval_secs, 90);
        assert_eq!(merged.webhook.url.as_deref(), Some("https://file"));
    }

    #[test]
    fn test_env_overrides_file_with_default_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.toml");
        std::fs::write(
            &path,
            "[liveness]\nenabled = false\ninterval_secs = 90\n\n[chat]\ncolors = true\n\n[auto_action]\ndelay_secs = 20\n",
        )
        .unwrap();
        let file = Config::from_file(&path).unwrap();

        let merged = file.merge(ConfigOverlay::from_lookup(env(&[
            ("ENABLE_JUMP", "1"),
            ("JUMP_INTERVAL", "60"),
            ("CHAT_COLORS", "0"),
            ("AUTO_TP_DELAY", "5"),
        ])));
        assert!(merged.liveness.enabled);
        assert_eq!(merged.liveness.interval_secs, 60);
        assert!(!merged.chat.colors);
        assert_eq!(merged.auto_action.delay_secs, 5);
    }

    #[test]
    fn test_empty_overlay_changes_nothing() {
        let overlay = ConfigOverlay::from_lookup(env(&[("IP", "  "), ("ENABLE_JUMP", "maybe")]));
        assert_eq!(overlay, ConfigOverlay::default());

        let mut file = Config::default();
        file.chat.colors = true;
        assert_eq!(file.clone().merge(overlay), file);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.liveness.interval_secs = 0;
        assert!(config.validate().is_err());
        config.liveness.enabled = false;
        assert!(config.validate().is_ok());
    }
}
