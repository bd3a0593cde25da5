//! Reveal cycle state machine.
//!
//! The animation loops over a 9 second period. Each time a new period begins
//! the cycle count ratchets up by one, until all three groups (plates, lines,
//! boxes) are on screen.

use serde::{Deserialize, Serialize};

/// Length of one animation period in milliseconds.
pub const PERIOD_MS: f64 = 9000.0;

/// A frame whose phase lands below this counts as "a period just started".
pub const CYCLE_START_WINDOW_MS: f32 = 100.0;

/// Highest cycle count; every group is visible from here on.
pub const MAX_CYCLE: u8 = 3;

/// Phase of the wall clock within the current period, in `[0, PERIOD_MS)`.
pub fn phase_of(now_ms: f64) -> f32 {
    now_ms.rem_euclid(PERIOD_MS) as f32
}

/// The bare transition rule: bump the count when the phase is inside the
/// start window, saturating at [`MAX_CYCLE`].
pub fn advance_cycle(previous: u8, phase: f32) -> u8 {
    if phase < CYCLE_START_WINDOW_MS && previous < MAX_CYCLE {
        previous + 1
    } else {
        previous.min(MAX_CYCLE)
    }
}

/// Index of the period containing `now_ms`; negative clocks give negative
/// indices.
pub fn period_of(now_ms: f64) -> i64 {
    now_ms.div_euclid(PERIOD_MS) as i64
}

/// Add `periods` to `count`, saturating at [`MAX_CYCLE`].
fn saturating_step(count: u8, periods: i64) -> u8 {
    let periods = periods.clamp(0, MAX_CYCLE as i64) as u8;
    count.saturating_add(periods).min(MAX_CYCLE)
}

/// How the tracker decides that a new period has begun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePolicy {
    /// Only a frame inside the start window of a period not seen before
    /// counts, and it counts once. Periods without such a frame are lost.
    Window,
    /// Every period boundary crossed since the last frame counts, plus a
    /// first frame inside the window.
    #[default]
    Wraparound,
}

/// Tracks the cycle count across frames.
#[derive(Debug, Clone)]
pub struct CycleTracker {
    policy: CyclePolicy,
    count: u8,
    last_period: Option<i64>,
}

impl CycleTracker {
    pub fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            count: 0,
            last_period: None,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Feed the wall-clock time of the current frame and return the updated
    /// count.
    pub fn observe(&mut self, now_ms: f64) -> u8 {
        let phase = phase_of(now_ms);
        let period = period_of(now_ms);

        let next = match (self.policy, self.last_period) {
            (_, None) => advance_cycle(self.count, phase),
            // A clock that steps backwards never reopens a period.
            (_, Some(last)) if period <= last => self.count,
            (CyclePolicy::Window, Some(_)) => advance_cycle(self.count, phase),
            (CyclePolicy::Wraparound, Some(last)) => saturating_step(self.count, period - last),
        };
        self.last_period = Some(self.last_period.map_or(period, |last| last.max(period)));

        if next != self.count {
            log::debug!("reveal cycle {} -> {} at phase {:.1}ms", self.count, next, phase);
            self.count = next;
        }
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_at(policy: CyclePolicy, count: u8) -> CycleTracker {
        CycleTracker {
            count,
            ..CycleTracker::new(policy)
        }
    }

    #[test]
    fn test_phase_wraps_into_period() {
        assert_eq!(phase_of(0.0), 0.0);
        assert_eq!(phase_of(9050.0), 50.0);
        assert_eq!(phase_of(27_000.0), 0.0);
        assert_eq!(phase_of(-100.0), 8900.0);
    }

    #[test]
    fn test_advance_cycle_rule() {
        assert_eq!(advance_cycle(0, 50.0), 1);
        assert_eq!(advance_cycle(1, 99.9), 2);
        assert_eq!(advance_cycle(1, 100.0), 1);
        assert_eq!(advance_cycle(3, 0.0), 3);
        assert_eq!(advance_cycle(2, 4500.0), 2);
    }

    #[test]
    fn test_period_index() {
        assert_eq!(period_of(0.0), 0);
        assert_eq!(period_of(8999.9), 0);
        assert_eq!(period_of(9000.0), 1);
        assert_eq!(period_of(-1.0), -1);
    }

    #[test]
    fn test_saturating_step() {
        assert_eq!(saturating_step(0, 1), 1);
        assert_eq!(saturating_step(1, 5), MAX_CYCLE);
        assert_eq!(saturating_step(2, 0), 2);
        assert_eq!(saturating_step(2, -4), 2);
    }

    #[test]
    fn test_first_frame_in_window_starts_cycle() {
        for policy in [CyclePolicy::Window, CyclePolicy::Wraparound] {
            let mut tracker = CycleTracker::new(policy);
            assert_eq!(tracker.observe(50.0), 1);
        }
    }

    #[test]
    fn test_first_frame_outside_window_waits() {
        let mut tracker = CycleTracker::new(CyclePolicy::Wraparound);
        assert_eq!(tracker.observe(400.0), 0);
        assert_eq!(tracker.observe(8990.0), 0);
        assert_eq!(tracker.observe(9010.0), 1);
    }

    #[test]
    fn test_one_increment_per_window() {
        for policy in [CyclePolicy::Window, CyclePolicy::Wraparound] {
            let mut tracker = CycleTracker::new(policy);
            for now in [0.0, 16.0, 33.0, 50.0, 66.0, 83.0, 99.0] {
                tracker.observe(now);
            }
            assert_eq!(tracker.count(), 1, "{policy:?}");
        }
    }

    #[test]
    fn test_low_frame_rate_skips_window() {
        // 4 fps: frames at 8950ms then 9200ms never land in [0, 100).
        let mut window = tracker_at(CyclePolicy::Window, 1);
        let mut wrap = tracker_at(CyclePolicy::Wraparound, 1);
        for now in [8700.0, 8950.0, 9200.0, 9450.0] {
            window.observe(now);
            wrap.observe(now);
        }
        assert_eq!(window.count(), 1);
        assert_eq!(wrap.count(), 2);
    }

    #[test]
    fn test_gap_of_several_periods_counts_each_one() {
        let mut tracker = CycleTracker::new(CyclePolicy::Wraparound);
        assert_eq!(tracker.observe(50.0), 1);
        // Redraws stalled across the periods starting at 9000ms and 18000ms.
        assert_eq!(tracker.observe(18_150.0), 3);
    }

    #[test]
    fn test_window_counts_next_period_after_gap() {
        let mut tracker = CycleTracker::new(CyclePolicy::Window);
        assert_eq!(tracker.observe(50.0), 1);
        assert_eq!(tracker.observe(9050.0), 2);
        // A long gap still lands only one frame in a window.
        assert_eq!(tracker.observe(40_510.0), 2);
        assert_eq!(tracker.observe(45_020.0), 3);
    }

    #[test]
    fn test_clock_stepping_back_does_not_recount() {
        let mut tracker = CycleTracker::new(CyclePolicy::Wraparound);
        assert_eq!(tracker.observe(9010.0), 1);
        assert_eq!(tracker.observe(20.0), 1);
        assert_eq!(tracker.observe(9030.0), 1);
        assert_eq!(tracker.observe(18_010.0), 2);
    }

    #[test]
    fn test_count_is_monotonic_and_capped() {
        for policy in [CyclePolicy::Window, CyclePolicy::Wraparound] {
            let mut tracker = CycleTracker::new(policy);
            let mut last = 0;
            let mut now = 0.0;
            while now < 60_000.0 {
                let count = tracker.observe(now);
                assert!(count >= last);
                assert!(count <= MAX_CYCLE);
                last = count;
                now += 16.667;
            }
            assert_eq!(last, MAX_CYCLE);
        }
    }
}
