use crate::timer::Timer;
use std::time::Duration;

/// Turns successive redraws into frame delta times.
///
/// The first tick yields zero; long stalls (window drags, breakpoints) are
/// clamped to `max_delta` so animations never jump.
#[derive(Debug, Clone)]
pub struct FrameClock<T: Timer> {
    timer: T,
    last: Option<u64>,
    max_delta: Duration,
}

impl<T: Timer> FrameClock<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            last: None,
            max_delta: Duration::from_millis(100),
        }
    }

    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    pub fn tick(&mut self) -> Duration {
        let now = self.timer.now();
        let delta = match self.last.replace(now) {
            Some(prev) => Duration::from_nanos(now.saturating_sub(prev)).min(self.max_delta),
            None => Duration::ZERO,
        };
        if !delta.is_zero() {
            self.timer.record_frame(delta);
        }
        delta
    }

    /// Forget the previous frame, e.g. when a new scene is mounted.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualTimer;

    #[test]
    fn first_tick_is_zero_then_deltas() {
        let timer = ManualTimer::new();
        let mut clock = FrameClock::new(timer.clone());
        assert_eq!(clock.tick(), Duration::ZERO);
        timer.advance(Duration::from_millis(16));
        assert_eq!(clock.tick(), Duration::from_millis(16));
        assert_eq!(clock.tick(), Duration::ZERO);
    }

    #[test]
    fn stalls_are_clamped() {
        let timer = ManualTimer::new();
        let mut clock = FrameClock::new(timer.clone()).with_max_delta(Duration::from_millis(50));
        clock.tick();
        timer.advance(Duration::from_secs(3));
        assert_eq!(clock.tick(), Duration::from_millis(50));
    }

    #[test]
    fn reset_restarts_from_zero() {
        let timer = ManualTimer::new();
        let mut clock = FrameClock::new(timer.clone());
        clock.tick();
        timer.advance(Duration::from_millis(20));
        clock.reset();
        assert_eq!(clock.tick(), Duration::ZERO);
        assert_eq!(clock.timer().calibration_stats().effective_fps, 0.0);
    }
}
