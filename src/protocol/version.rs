//! Game protocol versions and the fallback ladder.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TetherError};

/// A release version such as `1.21.4` or `1.21`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameVersion {
    major: u32,
    minor: u32,
    patch: Option<u32>,
}

impl GameVersion {
    /// First release whose chat packets carry signing metadata.
    pub const SIGNED_CHAT: GameVersion = GameVersion {
        major: 1,
        minor: 19,
        patch: None,
    };

    /// Create a version from its parts.
    pub fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether outbound chat needs timestamp/salt/signature fields.
    pub fn requires_signed_chat(&self) -> bool {
        *self >= Self::SIGNED_CHAT
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl Ord for GameVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for GameVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for GameVersion {
    type Err = TetherError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || TetherError::Config(format!("Invalid game version: {s:?}"));
        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> std::result::Result<Option<u32>, TetherError> {
            match parts.next() {
                Some(p) => p.parse().map(Some).map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(None),
            }
        };

        let major = next(true)?.ok_or_else(invalid)?;
        let minor = next(true)?.ok_or_else(invalid)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(major, minor, patch))
    }
}

impl Serialize for GameVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered, immutable list of versions to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLadder {
    candidates: Vec<GameVersion>,
}

impl VersionLadder {
    /// Build a ladder; at least one candidate is required.
    pub fn new(candidates: Vec<GameVersion>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(TetherError::Config(
                "Version ladder must contain at least one version".to_string(),
            ));
        }
        Ok(Self { candidates })
    }

    /// Single pinned version.
    pub fn pinned(version: GameVersion) -> Self {
        Self {
            candidates: vec![version],
        }
    }

    /// Parse a comma separated list like `1.21.4, 1.21.3`.
    pub fn parse_list(list: &str) -> Result<Self> {
        let candidates = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>>>()?;
        Self::new(candidates)
    }

    /// Candidate at `index`.
    pub fn get(&self, index: usize) -> Option<&GameVersion> {
        self.candidates.get(index)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Never true for a ladder built through [`VersionLadder::new`].
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterate candidates in order.
    pub fn iter(&self) -> impl Iterator<Item = &GameVersion> {
        self.candidates.iter()
    }
}

impl Default for VersionLadder {
    fn default() -> Self {
        let candidates = super::DEFAULT_LADDER
            .iter()
            .filter_map(|v| v.parse().ok())
            .collect();
        Self { candidates }
    }
}

impl fmt::Display for VersionLadder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.candidates.iter().map(ToString::to_string).collect();
        write!(f, "{}", joined.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        let v: GameVersion = "1.21.4".parse().unwrap();
        assert_eq!(v, GameVersion::new(1, 21, Some(4)));
        assert_eq!(v.to_string(), "1.21.4");

        let v: GameVersion = "1.21".parse().unwrap();
        assert_eq!(v.to_string(), "1.21");

        assert!("1".parse::<GameVersion>().is_err());
        assert!("1.x.3".parse::<GameVersion>().is_err());
        assert!("1.2.3.4".parse::<GameVersion>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        let a: GameVersion = "1.20.6".parse().unwrap();
        let b: GameVersion = "1.21".parse().unwrap();
        let c: GameVersion = "1.21.1".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(c.requires_signed_chat());
        assert!(!"1.18.2".parse::<GameVersion>().unwrap().requires_signed_chat());
        assert!("1.19".parse::<GameVersion>().unwrap().requires_signed_chat());
    }

    #[test]
    fn test_default_ladder() {
        let ladder = VersionLadder::default();
        assert_eq!(ladder.len(), 8);
        assert_eq!(ladder.get(0).unwrap().to_string(), "1.21.4");
        assert_eq!(ladder.get(7).unwrap().to_string(), "1.20.1");
    }

    #[test]
    fn test_parse_list() {
        let ladder = VersionLadder::parse_list("1.21.4, 1.20.1,").unwrap();
        assert_eq!(ladder.len(), 2);
        assert_eq!(ladder.to_string(), "1.21.4, 1.20.1");
        assert!(VersionLadder::parse_list(" , ").is_err());
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let v: GameVersion = serde_json::from_str("\"1.20.4\"").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.20.4\"");
    }
}
