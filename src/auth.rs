//! Authentication providers.
//!
//! A provider turns an account identifier plus a credential cache directory
//! into a [`Credentials`] bundle. Failures are not retried: they need a human.
//!
//! A provider may also resolve to no credentials at all. The session backend
//! then signs in on its own, reporting the device code through
//! [`SessionEventKind::AuthPrompt`](crate::protocol::SessionEventKind::AuthPrompt)
//! and writing the token cache for the next start.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{Result, TetherError};

/// How the client proves its identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Microsoft account via device-code sign-in.
    #[default]
    Microsoft,
    /// Offline-mode servers; no credentials.
    Offline,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Microsoft => write!(f, "microsoft"),
            AuthMode::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for AuthMode {
    type Err = TetherError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "microsoft" | "msa" => Ok(Self::Microsoft),
            "offline" => Ok(Self::Offline),
            _ => Err(TetherError::Config(format!("Unknown auth mode: {s}"))),
        }
    }
}

/// Player profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile UUID.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Opaque credential bundle handed to the session backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access token (empty for offline profiles).
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Player profile.
    pub profile: Profile,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Device-code sign-in prompt for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCode {
    /// Where to sign in.
    pub verification_uri: String,
    /// Code to enter there.
    pub user_code: String,
}

impl DeviceCode {
    /// One-line instruction for the console.
    pub fn prompt_line(&self) -> String {
        format!(
            "To sign in, open {} and enter code {}",
            self.verification_uri, self.user_code
        )
    }
}

/// Boxed authentication future. `None` leaves sign-in to the session backend.
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Credentials>>> + 'a>>;

/// Source of credentials.
pub trait AuthProvider {
    /// Fetch credentials for `account`, or `None` to sign in per session.
    fn authenticate<'a>(&'a self, account: &'a str, cache_dir: &'a Path) -> AuthFuture<'a>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Offline profile with a stable derived id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAuth;

impl OfflineAuth {
    /// Deterministic id for an offline player name.
    pub fn profile_id(name: &str) -> Uuid {
        Uuid::new_v3(
            &Uuid::NAMESPACE_OID,
            format!("OfflinePlayer:{name}").as_bytes(),
        )
    }
}

impl AuthProvider for OfflineAuth {
    fn authenticate<'a>(&'a self, account: &'a str, _cache_dir: &'a Path) -> AuthFuture<'a> {
        Box::pin(async move {
            if account.is_empty() || account.len() > 16 {
                return Err(TetherError::Auth(format!(
                    "Offline name must be 1-16 characters: {account:?}"
                )));
            }
            Ok(Some(Credentials {
                access_token: String::new(),
                profile: Profile {
                    id: Self::profile_id(account).to_string(),
                    name: account.to_string(),
                },
            }))
        })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Microsoft account sign-in.
///
/// Reuses the bundle a previous sign-in cached. With no usable cache the
/// session backend runs the device-code flow itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrosoftAuth;

impl MicrosoftAuth {
    /// Cache file for an account.
    pub fn cache_file(cache_dir: &Path, account: &str) -> PathBuf {
        let safe: String = account
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        cache_dir.join(format!("{safe}.json"))
    }

    /// Read the cached bundle. Missing, corrupt and token-less caches yield `None`.
    pub async fn read_cache(cache_dir: &Path, account: &str) -> Result<Option<Credentials>> {
        let path = Self::cache_file(cache_dir, account);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TetherError::Auth(format!(
                    "Cannot read credential cache {}: {e}",
                    path.display()
                )))
            },
        };
        match serde_json::from_str::<Credentials>(&raw) {
            Ok(creds) if !creds.access_token.is_empty() => Ok(Some(creds)),
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Credential cache has no access token");
                Ok(None)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring corrupt credential cache: {e}");
                Ok(None)
            },
        }
    }
}

impl AuthProvider for MicrosoftAuth {
    fn authenticate<'a>(&'a self, account: &'a str, cache_dir: &'a Path) -> AuthFuture<'a> {
        Box::pin(async move {
            let cached = Self::read_cache(cache_dir, account).await?;
            if cached.is_none() {
                tracing::info!(account, "No cached sign-in; the server connection will prompt for one");
            }
            Ok(cached)
        })
    }

    fn name(&self) -> &'static str {
        "microsoft"
    }
}

/// Provider for an auth mode.
pub fn provider_for(mode: AuthMode) -> Box<dyn AuthProvider> {
    match mode {
        AuthMode::Microsoft => Box::new(MicrosoftAuth),
        AuthMode::Offline => Box::new(OfflineAuth),
    }
}

/// Startup authentication: prepare the cache directory and run the
/// configured provider.
pub async fn sign_in(config: &AuthConfig) -> Result<Option<Credentials>> {
    let cache_dir = config.cache_dir();
    ensure_cache_dir(&cache_dir)?;
    let provider = provider_for(config.mode);
    let credentials = provider.authenticate(&config.account, &cache_dir).await?;
    if let Some(creds) = &credentials {
        tracing::info!(provider = provider.name(), profile = %creds.profile.name, "Authenticated");
    }
    Ok(credentials)
}

/// Create the credential cache directory if missing.
pub fn ensure_cache_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        TetherError::Config(format!(
            "Failed to create credential cache {}: {e}",
            path.display()
        ))
    })
}
