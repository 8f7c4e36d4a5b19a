//! Version negotiation over the fallback ladder.
//!
//! The negotiator only tracks position; the supervisor decides when a
//! failure counts as a mismatch and owns all timing.
//!
//! ```text
//!   next_candidate()
//!        │
//!        ├── index < len ──────────────> Try(version)
//!        │
//!        └── index == len ── attempts += 1
//!                 │
//!                 ├── attempts <= MAX ──> Restart (index = 0)
//!                 └── attempts >  MAX ──> Exhausted
//! ```

use super::version::{GameVersion, VersionLadder};
use super::MAX_LADDER_ATTEMPTS;

/// Outcome of asking for the next version to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Attempt a handshake with this version.
    Try(GameVersion),
    /// The ladder ran out; it has been rewound and should be retried later.
    Restart {
        /// Full traversals completed so far.
        attempts: u32,
    },
    /// The ladder ran out too many times.
    Exhausted {
        /// Full traversals completed.
        attempts: u32,
    },
}

/// Tracks traversal of a [`VersionLadder`].
#[derive(Debug, Clone)]
pub struct Negotiator {
    ladder: VersionLadder,
    index: usize,
    attempts: u32,
    max_attempts: u32,
}

impl Negotiator {
    /// Create a negotiator positioned at the first candidate.
    pub fn new(ladder: VersionLadder) -> Self {
        Self {
            ladder,
            index: 0,
            attempts: 0,
            max_attempts: MAX_LADDER_ATTEMPTS,
        }
    }

    /// Override the exhaustion threshold.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Decide what the next connection attempt should do.
    pub fn next_candidate(&mut self) -> Candidate {
        if let Some(version) = self.ladder.get(self.index) {
            return Candidate::Try(version.clone());
        }

        self.attempts += 1;
        if self.attempts > self.max_attempts {
            return Candidate::Exhausted {
                attempts: self.attempts,
            };
        }

        self.index = 0;
        Candidate::Restart {
            attempts: self.attempts,
        }
    }

    /// Move past the current candidate after a version-specific failure.
    pub fn advance(&mut self) -> usize {
        if self.index < self.ladder.len() {
            self.index += 1;
        }
        self.index
    }

    /// Handshake succeeded; start from the top next time.
    pub fn reset(&mut self) {
        self.index = 0;
        self.attempts = 0;
    }

    /// Version at the current position, if any.
    pub fn current(&self) -> Option<&GameVersion> {
        self.ladder.get(self.index)
    }

    /// Current traversal position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Completed full traversals.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The ladder being traversed.
    pub fn ladder(&self) -> &VersionLadder {
        &self.ladder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(list: &str) -> VersionLadder {
        VersionLadder::parse_list(list).unwrap()
    }

    #[test]
    fn test_walks_ladder_in_order() {
        let mut neg = Negotiator::new(ladder("1.21.4, 1.21.3, 1.21.1"));
        assert_eq!(neg.next_candidate(), Candidate::Try("1.21.4".parse().unwrap()));
        assert_eq!(neg.advance(), 1);
        assert_eq!(neg.next_candidate(), Candidate::Try("1.21.3".parse().unwrap()));
        assert_eq!(neg.advance(), 2);
        assert_eq!(neg.next_candidate(), Candidate::Try("1.21.1".parse().unwrap()));
        assert_eq!(neg.attempts(), 0);
    }

    #[test]
    fn test_restart_after_exhaustion() {
        let mut neg = Negotiator::new(ladder("1.21, 1.20.6"));
        neg.advance();
        neg.advance();
        assert_eq!(neg.next_candidate(), Candidate::Restart { attempts: 1 });
        assert_eq!(neg.index(), 0);
        assert_eq!(neg.next_candidate(), Candidate::Try("1.21".parse().unwrap()));
    }

    #[test]
    fn test_exhausted_after_max_attempts() {
        let mut neg = Negotiator::new(ladder("1.21"));
        for expected in 1..=MAX_LADDER_ATTEMPTS {
            neg.advance();
            assert_eq!(
                neg.next_candidate(),
                Candidate::Restart { attempts: expected }
            );
        }
        neg.advance();
        assert_eq!(
            neg.next_candidate(),
            Candidate::Exhausted {
                attempts: MAX_LADDER_ATTEMPTS + 1
            }
        );
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut neg = Negotiator::new(ladder("1.21, 1.20.6"));
        neg.advance();
        neg.advance();
        neg.next_candidate();
        neg.advance();
        neg.reset();
        assert_eq!(neg.index(), 0);
        assert_eq!(neg.attempts(), 0);
    }

    #[test]
    fn test_advance_saturates_at_end() {
        let mut neg = Negotiator::new(ladder("1.21"));
        assert_eq!(neg.advance(), 1);
        assert_eq!(neg.advance(), 1);
        assert!(neg.current().is_none());
    }
}
