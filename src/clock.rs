//! Millisecond clocks driving the animation.

use std::time::Instant;

/// A monotonic millisecond clock with an arbitrary epoch.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock for offline rendering: frame `n` is at
/// `start_ms + n * 1000 / fps`.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    start_ms: f64,
    fps: f64,
    frame: u64,
}

impl FixedStepClock {
    pub fn new(fps: f64, start_ms: f64) -> Self {
        Self {
            start_ms,
            fps: if fps > 0.0 { fps } else { 60.0 },
            frame: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

impl Clock for FixedStepClock {
    fn now_millis(&self) -> f64 {
        self.start_ms + self.frame as f64 * self.frame_duration_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_advances_by_frame_duration() {
        let mut clock = FixedStepClock::new(50.0, 100.0);
        assert_eq!(clock.now_millis(), 100.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.frame(), 2);
        assert!((clock.now_millis() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_step_rejects_non_positive_fps() {
        let clock = FixedStepClock::new(0.0, 0.0);
        assert!((clock.frame_duration_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
