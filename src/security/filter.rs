//! Outbound safety filter.
//!
//! Rules are checked in a fixed order: forbidden substrings, then length,
//! then blank input. The first rule that triggers is reported.

use std::fmt;

use crate::config::ChatConfig;
use crate::error::{Result, TetherError};

/// Rule that rejected a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRule {
    /// Contains a forbidden substring.
    Forbidden(String),
    /// Longer than the configured maximum (characters).
    TooLong {
        /// Message length.
        length: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Empty or whitespace only.
    Blank,
}

impl FilterRule {
    /// Stable rule name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            FilterRule::Forbidden(_) => "forbidden_substring",
            FilterRule::TooLong { .. } => "too_long",
            FilterRule::Blank => "blank",
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::Forbidden(s) => write!(f, "contains forbidden text {s:?}"),
            FilterRule::TooLong { length, max } => {
                write!(f, "too long ({length} > {max} characters)")
            },
            FilterRule::Blank => write!(f, "empty message"),
        }
    }
}

/// Immutable filter applied to every user-originated message.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    /// Substrings that block a message
    forbidden: Vec<String>,
    /// Maximum length in characters
    max_length: usize,
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

impl SafetyFilter {
    /// Create a filter.
    pub fn new(forbidden: Vec<String>, max_length: usize) -> Self {
        let forbidden = forbidden.into_iter().filter(|s| !s.is_empty()).collect();
        Self {
            forbidden,
            max_length,
        }
    }

    /// Filter from chat configuration.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.forbidden.clone(), config.max_length)
    }

    /// Maximum message length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Check a message, reporting the first rule it breaks.
    pub fn check(&self, message: &str) -> std::result::Result<(), FilterRule> {
        if let Some(hit) = self.forbidden.iter().find(|f| message.contains(f.as_str())) {
            return Err(FilterRule::Forbidden(hit.clone()));
        }

        let length = message.chars().count();
        if length > self.max_length {
            return Err(FilterRule::TooLong {
                length,
                max: self.max_length,
            });
        }

        if message.trim().is_empty() {
            return Err(FilterRule::Blank);
        }

        Ok(())
    }

    /// Whether a message passes.
    pub fn is_safe(&self, message: &str) -> bool {
        self.check(message).is_ok()
    }

    /// Check a message and log the rule that blocked it.
    pub fn enforce(&self, message: &str) -> Result<()> {
        self.check(message).map_err(|rule| {
            tracing::info!(rule = rule.name(), "Blocked outbound message: {rule}");
            TetherError::Blocked(rule.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_message() {
        let filter = SafetyFilter::default();
        assert!(filter.is_safe("hello world"));
        assert!(filter.is_safe("/spawn"));
    }

    #[test]
    fn test_forbidden_substring() {
        let filter = SafetyFilter::default();
        assert_eq!(
            filter.check("${jndi:ldap://x}"),
            Err(FilterRule::Forbidden("$".to_string()))
        );
    }

    #[test]
    fn test_length_limit() {
        let filter = SafetyFilter::new(vec![], 5);
        assert!(filter.is_safe("12345"));
        assert_eq!(
            filter.check("123456"),
            Err(FilterRule::TooLong { length: 6, max: 5 })
        );
        // Characters, not bytes
        assert!(filter.is_safe("äääää"));
    }

    #[test]
    fn test_blank_messages() {
        let filter = SafetyFilter::default();
        assert_eq!(filter.check(""), Err(FilterRule::Blank));
        assert_eq!(filter.check("   \t"), Err(FilterRule::Blank));
    }

    #[test]
    fn test_rule_order() {
        let filter = SafetyFilter::new(vec!["$".to_string()], 3);
        // Forbidden wins over length
        assert_eq!(filter.check("$$$$$").unwrap_err().name(), "forbidden_substring");
        // Length wins over blank
        assert_eq!(filter.check("      ").unwrap_err().name(), "too_long");
    }

    #[test]
    fn test_empty_forbidden_entries_ignored() {
        let filter = SafetyFilter::new(vec![String::new()], 10);
        assert!(filter.is_safe("hi"));
    }

    #[test]
    fn test_enforce_maps_to_blocked() {
        let filter = SafetyFilter::default();
        assert!(matches!(filter.enforce("$"), Err(TetherError::Blocked(_))));
        assert!(filter.enforce("ok").is_ok());
    }
}
