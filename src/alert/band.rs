//! Threshold-crossing state machine.
//!
//! Tracks where the last observed rate sits relative to the configured
//! band and decides whether a crossing notification is due. An alert
//! fires only on *entry* into an out-of-band state; repeated samples on
//! the same side stay silent until the rate comes back and crosses
//! again.

use crate::alert::bounds::ThresholdBounds;

/// Position of the last sample relative to the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CrossingState {
    #[default]
    Inside,
    AboveMax,
    BelowMin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    High,
    Low,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// Single-instrument crossing tracker.
///
/// Callers must serialize `observe` calls; the decision and the state
/// update are one step, so interleaved evaluations could double-fire
/// or miss a crossing.
#[derive(Debug, Default)]
pub struct BandTracker {
    state: CrossingState,
}

impl BandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CrossingState {
        self.state
    }

    /// Forces the tracker back to `Inside` without firing.
    ///
    /// Applied whenever the market window closes so the next session
    /// starts clean.
    pub fn reset(&mut self) {
        self.state = CrossingState::Inside;
    }

    /// Classifies `value` against `bounds` and commits the transition.
    ///
    /// Boundary values count as crossed. The high branch wins when both
    /// comparisons hold (unreachable while `min < max` is enforced).
    pub fn observe(&mut self, value: f64, bounds: ThresholdBounds) -> Option<AlertKind> {
        let next = if value >= bounds.max {
            CrossingState::AboveMax
        } else if value <= bounds.min {
            CrossingState::BelowMin
        } else {
            CrossingState::Inside
        };

        let fired = match next {
            CrossingState::AboveMax if self.state != CrossingState::AboveMax => {
                Some(AlertKind::High)
            }
            CrossingState::BelowMin if self.state != CrossingState::BelowMin => Some(AlertKind::Low),
            _ => None,
        };

        self.state = next;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ThresholdBounds {
        ThresholdBounds {
            min: 35.0,
            max: 50.0,
        }
    }

    fn run(tracker: &mut BandTracker, values: &[f64]) -> Vec<Option<AlertKind>> {
        values.iter().map(|v| tracker.observe(*v, bounds())).collect()
    }

    #[test]
    fn fires_once_while_staying_above_max() {
        let mut tracker = BandTracker::new();
        let fired = run(&mut tracker, &[40.0, 52.0, 53.0, 51.0]);

        assert_eq!(fired, vec![None, Some(AlertKind::High), None, None]);
        assert_eq!(tracker.state(), CrossingState::AboveMax);
    }

    #[test]
    fn refires_after_returning_inside_and_crossing_low() {
        let mut tracker = BandTracker::new();
        let fired = run(&mut tracker, &[40.0, 52.0, 40.0, 30.0]);

        assert_eq!(
            fired,
            vec![None, Some(AlertKind::High), None, Some(AlertKind::Low)]
        );
        assert_eq!(tracker.state(), CrossingState::BelowMin);
    }

    #[test]
    fn direct_swing_low_to_high_fires_both() {
        let mut tracker = BandTracker::new();
        let fired = run(&mut tracker, &[30.0, 55.0]);

        assert_eq!(fired, vec![Some(AlertKind::Low), Some(AlertKind::High)]);
    }

    #[test]
    fn boundary_values_count_as_crossed() {
        let mut tracker = BandTracker::new();
        assert_eq!(tracker.observe(50.0, bounds()), Some(AlertKind::High));

        let mut tracker = BandTracker::new();
        assert_eq!(tracker.observe(35.0, bounds()), Some(AlertKind::Low));
    }

    #[test]
    fn reset_silences_the_next_entry_check() {
        let mut tracker = BandTracker::new();
        tracker.observe(60.0, bounds());
        assert_eq!(tracker.state(), CrossingState::AboveMax);

        tracker.reset();
        assert_eq!(tracker.state(), CrossingState::Inside);

        // Still above max after the reset: counts as a fresh entry.
        assert_eq!(tracker.observe(60.0, bounds()), Some(AlertKind::High));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any rise through `max` followed by a fall through `min`
        /// fires exactly one high and then one low alert, regardless
        /// of how many samples dwell on either side.
        #[test]
        fn rise_then_fall_fires_exactly_two(
            inside in prop::collection::vec(35.1..49.9f64, 1..8),
            above in prop::collection::vec(50.0..90.0f64, 1..8),
            below in prop::collection::vec(0.0..34.9f64, 1..8),
        ) {
            let bounds = ThresholdBounds { min: 35.0, max: 50.0 };
            let mut tracker = BandTracker::new();
            let mut fired = Vec::new();

            for v in inside.iter().chain(&above).chain(&below) {
                if let Some(kind) = tracker.observe(*v, bounds) {
                    fired.push(kind);
                }
            }

            prop_assert_eq!(fired, vec![AlertKind::High, AlertKind::Low]);
        }
    }
}
