//! Anti-idle driver.
//!
//! While a session is ready, a control is pressed every `interval` and
//! released [`PRESS_DURATION`] later so the server never sees the client as
//! idle. Failures are logged at debug level and otherwise ignored.

use std::time::{Duration, Instant};

use crate::config::LivenessConfig;
use crate::protocol::{Control, GameSession};
use crate::supervisor::{TimerKind, Timers};

/// How long the control is held.
pub const PRESS_DURATION: Duration = Duration::from_millis(500);

/// Periodic press/release schedule.
#[derive(Debug, Clone)]
pub struct LivenessDriver {
    enabled: bool,
    interval: Duration,
    control: Control,
}

impl Default for LivenessDriver {
    fn default() -> Self {
        Self::from_config(&LivenessConfig::default())
    }
}

impl LivenessDriver {
    /// Create a driver that jumps every `interval`.
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            control: Control::Jump,
        }
    }

    /// From configuration.
    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::new(config.enabled, config.interval())
    }

    /// Use a different control.
    pub fn with_control(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    /// Whether the driver runs at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Press interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule the first press. Any previous schedule is replaced.
    pub fn start(&self, timers: &mut Timers, now: Instant) -> bool {
        if !self.enabled || self.interval.is_zero() {
            return false;
        }
        timers.schedule(TimerKind::LivenessTick, now + self.interval);
        true
    }

    /// Cancel press and release.
    pub fn stop(&self, timers: &mut Timers) {
        timers.cancel(TimerKind::LivenessTick);
        timers.cancel(TimerKind::LivenessRelease);
    }

    /// Press the control and schedule both the release and the next press.
    pub fn tick(&self, session: &mut dyn GameSession, timers: &mut Timers, now: Instant) {
        timers.schedule(TimerKind::LivenessTick, now + self.interval);
        if !session.has_entity() {
            tracing::debug!("Anti-idle skipped: no entity");
            return;
        }
        match session.set_control_state(self.control, true) {
            Ok(()) => {
                timers.schedule(TimerKind::LivenessRelease, now + PRESS_DURATION);
                tracing::debug!(control = self.control.as_str(), "Anti-idle press");
            },
            Err(e) => tracing::debug!("Anti-idle press failed: {e}"),
        }
    }

    /// Release the control.
    pub fn release(&self, session: &mut dyn GameSession) {
        if let Err(e) = session.set_control_state(self.control, false) {
            tracing::debug!("Anti-idle release failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TetherError};
    use serde_json::Value;

    #[derive(Default)]
    struct Recorder {
        entity: bool,
        fail: bool,
        presses: Vec<(Control, bool)>,
    }

    impl GameSession for Recorder {
        fn has_entity(&self) -> bool {
            self.entity
        }
        fn chat(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
        fn set_control_state(&mut self, control: Control, state: bool) -> Result<()> {
            if self.fail {
                return Err(TetherError::Session("gone".into()));
            }
            self.presses.push((control, state));
            Ok(())
        }
        fn respawn(&mut self) -> Result<()> {
            Ok(())
        }
        fn quit(&mut self, _reason: Option<&str>) -> Result<()> {
            Ok(())
        }
        fn write(&mut self, _packet: &str, _payload: Value) -> Result<()> {
            Ok(())
        }
        fn detach(&mut self) {}
    }

    #[test]
    fn test_start_respects_enabled() {
        let now = Instant::now();
        let mut timers = Timers::new();
        assert!(!LivenessDriver::new(false, Duration::from_secs(60)).start(&mut timers, now));
        assert!(timers.is_empty());

        assert!(LivenessDriver::new(true, Duration::from_secs(60)).start(&mut timers, now));
        assert_eq!(
            timers.deadline(TimerKind::LivenessTick),
            Some(now + Duration::from_secs(60))
        );
    }

    #[test]
    fn test_tick_presses_and_schedules_release() {
        let now = Instant::now();
        let driver = LivenessDriver::new(true, Duration::from_secs(30));
        let mut timers = Timers::new();
        let mut session = Recorder {
            entity: true,
            ..Default::default()
        };

        driver.tick(&mut session, &mut timers, now);
        assert_eq!(session.presses, vec![(Control::Jump, true)]);
        assert_eq!(timers.deadline(TimerKind::LivenessRelease), Some(now + PRESS_DURATION));
        assert_eq!(
            timers.deadline(TimerKind::LivenessTick),
            Some(now + Duration::from_secs(30))
        );

        driver.release(&mut session);
        assert_eq!(session.presses.last(), Some(&(Control::Jump, false)));
    }

    #[test]
    fn test_tick_without_entity_or_with_errors() {
        let now = Instant::now();
        let driver = LivenessDriver::new(true, Duration::from_secs(30));
        let mut timers = Timers::new();

        let mut idle = Recorder::default();
        driver.tick(&mut idle, &mut timers, now);
        assert!(idle.presses.is_empty());
        assert!(!timers.is_scheduled(TimerKind::LivenessRelease));

        let mut broken = Recorder {
            entity: true,
            fail: true,
            ..Default::default()
        };
        driver.tick(&mut broken, &mut timers, now);
        driver.release(&mut broken);
        assert!(timers.is_scheduled(TimerKind::LivenessTick));
    }

    #[test]
    fn test_stop_cancels_both() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::LivenessTick, now);
        timers.schedule(TimerKind::LivenessRelease, now);
        LivenessDriver::default().stop(&mut timers);
        assert!(timers.is_empty());
    }
}
