use std::time::Duration;

use crate::feedback::Feedback;

/// How long a screen shake lasts after being triggered.
pub const SHAKE_DURATION: Duration = Duration::from_millis(200);

/// Screen-shake state with a matching haptic pulse.
#[derive(Debug, Clone, Default)]
pub struct Juice {
    shake: u32,
    remaining: Duration,
}

impl Juice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a shake of `intensity` and pulse the haptic collaborator.
    pub fn trigger(&mut self, intensity: u32, fx: &mut Feedback) {
        self.shake = intensity;
        self.remaining = SHAKE_DURATION;
        fx.pulse(intensity);
    }

    pub fn update(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.shake = 0;
        }
    }

    /// Current shake intensity, 0 when at rest.
    pub fn shake(&self) -> u32 {
        self.shake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FeedbackEvent, recording_feedback};

    #[test]
    fn shake_decays_after_duration() {
        let (mut fx, log) = recording_feedback();
        let mut juice = Juice::new();
        juice.trigger(10, &mut fx);
        assert_eq!(juice.shake(), 10);
        juice.update(Duration::from_millis(150));
        assert_eq!(juice.shake(), 10);
        juice.update(Duration::from_millis(50));
        assert_eq!(juice.shake(), 0);
        assert_eq!(log.events(), vec![FeedbackEvent::Pulse(10)]);
    }

    #[test]
    fn retrigger_restarts_timer() {
        let mut fx = Feedback::silent();
        let mut juice = Juice::new();
        juice.trigger(5, &mut fx);
        juice.update(Duration::from_millis(190));
        juice.trigger(30, &mut fx);
        juice.update(Duration::from_millis(100));
        assert_eq!(juice.shake(), 30);
    }
}
