// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell timer: turns sustained gaze on one target into a single completion.
//!
//! ## Rules
//!
//! - A change of target (including to or from `None`) restarts the episode at zero.
//! - Time only accumulates while a target is present.
//! - Completion fires on the tick the accumulator first reaches the threshold.
//! - After completion the timer forgets the target and holds at zero while the
//!   same target stays under the gaze; it must be left and re-entered to fire again.
//!
//! - Completion compares with a tolerance of [`TIME_EPSILON`] (scaled by the
//!   threshold) so frame deltas such as `1.0 / 90.0` complete on the expected tick.
//!
//! ## Minimal example
//!
//! ```
//! use glance_router::dwell::DwellTimer;
//! let mut dwell: DwellTimer<u32> = DwellTimer::new(1.0);
//! assert_eq!(dwell.update(Some(7), 0.5), 0.5);
//! assert_eq!(dwell.update(Some(7), 0.5), 1.0);
//! assert!(dwell.has_completed());
//! assert_eq!(dwell.update(Some(7), 0.5), 0.0);
//! assert!(!dwell.has_completed());
//! ```

use crate::types::TIME_EPSILON;

/// Per-target dwell accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct DwellTimer<K> {
    tracked: Option<K>,
    // Target of the last completion, held until the gaze leaves it.
    spent: Option<K>,
    elapsed: f64,
    threshold: f64,
    completed: bool,
}

impl<K: Copy + Eq> DwellTimer<K> {
    /// Create a timer that completes after `threshold` seconds.
    pub fn new(threshold: f64) -> Self {
        Self {
            tracked: None,
            spent: None,
            elapsed: 0.0,
            threshold,
            completed: false,
        }
    }

    /// Configured threshold in seconds.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Change the threshold. The running episode keeps its accumulated time.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    /// Advance the timer by `dt` seconds with `current` under the gaze.
    ///
    /// Returns progress in `[0, 1]`; the completing tick returns `1.0`.
    /// Negative or NaN `dt` counts as zero.
    pub fn update(&mut self, current: Option<K>, dt: f64) -> f32 {
        self.completed = false;
        if self.spent.is_some() && self.spent != current {
            self.spent = None;
        }
        if current.is_some() && current == self.spent {
            return 0.0;
        }
        if current != self.tracked {
            self.tracked = current;
            self.elapsed = 0.0;
        }
        if current.is_none() {
            return 0.0;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.threshold - self.slack() {
            self.completed = true;
            self.spent = current;
            self.tracked = None;
            self.elapsed = 0.0;
            return 1.0;
        }
        self.progress()
    }

    // Summed frame deltas fall a few ulps short of round thresholds.
    fn slack(&self) -> f64 {
        TIME_EPSILON * self.threshold.max(1.0)
    }

    /// Whether the last [`update`](Self::update) completed an episode.
    pub fn has_completed(&self) -> bool {
        self.completed
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.threshold <= 0.0 {
            return if self.tracked.is_some() { 1.0 } else { 0.0 };
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Progress is a presentation value in [0, 1]."
        )]
        let p = (self.elapsed / self.threshold).clamp(0.0, 1.0) as f32;
        p
    }

    /// Seconds accumulated in the running episode.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Target of the running episode.
    pub fn tracked(&self) -> Option<K> {
        self.tracked
    }

    /// Whether an episode is running.
    pub fn is_tracking(&self) -> bool {
        self.tracked.is_some()
    }

    /// Forget the running episode and any completed target.
    pub fn reset(&mut self) {
        self.tracked = None;
        self.spent = None;
        self.elapsed = 0.0;
        self.completed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn progress_accumulates_toward_threshold() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        assert_eq!(d.update(Some(1), 0.5), 0.25);
        assert_eq!(d.update(Some(1), 0.5), 0.5);
        assert_eq!(d.tracked(), Some(1));
        assert_eq!(d.elapsed(), 1.0);
        assert!(!d.has_completed());
    }

    #[test]
    fn completes_exactly_at_threshold() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        let mut fired = 0;
        for _ in 0..8 {
            d.update(Some(1), 0.25);
            if d.has_completed() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(!d.is_tracking());
        assert_eq!(d.elapsed(), 0.0);
    }

    #[test]
    fn staring_after_completion_does_not_refire() {
        let mut d: DwellTimer<u32> = DwellTimer::new(1.0);
        d.update(Some(1), 1.0);
        assert!(d.has_completed());
        for _ in 0..100 {
            assert_eq!(d.update(Some(1), 0.5), 0.0);
            assert!(!d.has_completed());
        }
    }

    #[test]
    fn re_entry_after_exit_fires_again() {
        let mut d: DwellTimer<u32> = DwellTimer::new(1.0);
        d.update(Some(1), 1.0);
        assert!(d.has_completed());
        d.update(None, 0.1);
        d.update(Some(1), 1.0);
        assert!(d.has_completed());
    }

    #[test]
    fn other_target_counts_as_exit() {
        let mut d: DwellTimer<u32> = DwellTimer::new(1.0);
        d.update(Some(1), 1.0);
        assert!(d.has_completed());
        assert_eq!(d.update(Some(2), 0.5), 0.5);
        d.update(Some(1), 1.0);
        assert!(d.has_completed());
    }

    #[test]
    fn target_change_resets_accumulator() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        d.update(Some(1), 1.5);
        assert_eq!(d.update(Some(2), 0.5), 0.25);
        assert_eq!(d.tracked(), Some(2));
    }

    #[test]
    fn null_target_is_zero() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        d.update(Some(1), 1.0);
        assert_eq!(d.update(None, 1.0), 0.0);
        assert_eq!(d.elapsed(), 0.0);
        assert!(!d.is_tracking());
    }

    #[test]
    fn negative_and_nan_dt_do_not_rewind() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        d.update(Some(1), 1.0);
        assert_eq!(d.update(Some(1), -5.0), 0.5);
        assert_eq!(d.update(Some(1), f64::NAN), 0.5);
    }

    #[test]
    fn completes_on_expected_frame_at_headset_rates() {
        for rate in [60_u32, 72, 90, 120] {
            let dt = 1.0 / f64::from(rate);
            let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
            let fired = (1..=4 * rate).find(|_| {
                let _ = d.update(Some(1), dt);
                d.has_completed()
            });
            assert_eq!(fired, Some(2 * rate), "rate {rate}");
        }
    }

    #[test]
    fn progress_just_before_completion_stays_below_one() {
        let mut d: DwellTimer<u32> = DwellTimer::new(2.0);
        let dt = 1.0 / 90.0;
        let mut last = 0.0;
        for _ in 0..179 {
            last = d.update(Some(1), dt);
        }
        assert!(last < 1.0);
        assert!(!d.has_completed());
        assert_eq!(d.update(Some(1), dt), 1.0);
        assert!(d.has_completed());
    }

    proptest! {
        /// Progress under continuous gaze is non-decreasing and equals min(1, t / threshold)
        /// until completion.
        #[test]
        fn progress_is_monotonic(
            threshold in 0.5_f64..5.0,
            steps in prop::collection::vec(0.0_f64..0.2, 1..200),
        ) {
            let mut d: DwellTimer<u32> = DwellTimer::new(threshold);
            let mut last = 0.0_f32;
            let mut t = 0.0_f64;
            for dt in steps {
                let p = d.update(Some(9), dt);
                t += dt;
                if d.has_completed() {
                    prop_assert!(t >= threshold - 1e-8);
                    prop_assert_eq!(p, 1.0);
                    break;
                }
                prop_assert!(p >= last);
                #[allow(clippy::cast_possible_truncation, reason = "Test comparison in f32.")]
                let expected = (t / threshold).min(1.0) as f32;
                prop_assert!((p - expected).abs() < 1e-4);
                last = p;
            }
        }
    }
}
