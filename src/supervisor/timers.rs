//! Named deadlines.
//!
//! One slot per [`TimerKind`]: scheduling a kind that is already pending
//! replaces it, so two timers of the same kind can never run together.

use std::collections::BTreeMap;
use std::time::Instant;

/// Every timer the supervisor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Start the next connection attempt.
    Reconnect,
    /// Handshake produced no ready signal in time.
    HandshakeTimeout,
    /// Next anti-idle press.
    LivenessTick,
    /// Release the anti-idle control.
    LivenessRelease,
    /// Run the configured command after a forced removal.
    AutoAction,
    /// Respawn after death.
    Respawn,
}

impl TimerKind {
    /// Name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TimerKind::Reconnect => "reconnect",
            TimerKind::HandshakeTimeout => "handshake_timeout",
            TimerKind::LivenessTick => "liveness_tick",
            TimerKind::LivenessRelease => "liveness_release",
            TimerKind::AutoAction => "auto_action",
            TimerKind::Respawn => "respawn",
        }
    }
}

/// Pending deadlines, at most one per kind.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: BTreeMap<TimerKind, Instant>,
}

impl Timers {
    /// No timers pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` at `at`, returning the deadline it replaced.
    pub fn schedule(&mut self, kind: TimerKind, at: Instant) -> Option<Instant> {
        tracing::trace!(timer = kind.name(), "Timer scheduled");
        self.deadlines.insert(kind, at)
    }

    /// Cancel `kind`. Returns whether it was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    /// Whether `kind` is pending.
    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    /// Deadline of `kind`, if pending.
    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.deadlines.get(&kind).copied()
    }

    /// Earliest pending deadline.
    pub fn next(&self) -> Option<(TimerKind, Instant)> {
        self.deadlines
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(kind, at)| (*kind, *at))
    }

    /// Remove and return the earliest timer that is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerKind> {
        let (kind, at) = self.next()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&kind);
        Some(kind)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_schedule_replaces() {
        let now = Instant::now();
        let mut timers = Timers::new();
        assert!(timers.schedule(TimerKind::LivenessTick, now).is_none());
        assert_eq!(
            timers.schedule(TimerKind::LivenessTick, now + Duration::from_secs(1)),
            Some(now)
        );
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Reconnect, now + Duration::from_secs(5));
        timers.schedule(TimerKind::LivenessRelease, now + Duration::from_millis(500));
        timers.schedule(TimerKind::Respawn, now + Duration::from_secs(60));

        let later = now + Duration::from_secs(6);
        assert_eq!(timers.pop_due(later), Some(TimerKind::LivenessRelease));
        assert_eq!(timers.pop_due(later), Some(TimerKind::Reconnect));
        assert_eq!(timers.pop_due(later), None);
        assert!(timers.is_scheduled(TimerKind::Respawn));
    }

    #[test]
    fn test_cancel_and_clear() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::AutoAction, now);
        assert!(timers.cancel(TimerKind::AutoAction));
        assert!(!timers.cancel(TimerKind::AutoAction));

        timers.schedule(TimerKind::Reconnect, now);
        timers.schedule(TimerKind::HandshakeTimeout, now);
        timers.clear();
        assert!(timers.is_empty());
        assert_eq!(timers.next(), None);
    }
}
