use crate::error::ValidationError;

use super::SpeedOp;

/// Rate returned by [`SpeedLadder::reset`], independent of ladder bounds.
pub const BASELINE_SPEED: f64 = 1.0;
pub const DEFAULT_MIN: f64 = 1.0;
pub const DEFAULT_MAX: f64 = 3.0;
pub const DEFAULT_STEP: f64 = 0.25;
/// Upper bound on the number of rungs a configured ladder may have.
pub const MAX_LADDER_LEN: usize = 1024;

/// Tolerance used when counting steps so `(max - min) / step` landing a hair
/// under an integer still includes `max`.
const STEP_EPSILON: f64 = 1e-9;

fn rung_steps(min: f64, max: f64, step: f64) -> f64 {
    ((max - min) / step + STEP_EPSILON).floor()
}

/// Ordered, strictly increasing set of allowed playback rates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedLadder {
    speeds: Vec<f64>,
}

impl Default for SpeedLadder {
    fn default() -> Self {
        Self::from_bounds(DEFAULT_MIN, DEFAULT_MAX, DEFAULT_STEP)
    }
}

impl SpeedLadder {
    /// Builds a ladder of `min, min + step, ...` up to and including `max`.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not finite, `min` or `step` is not
    /// positive, `max` is below `min`, or the ladder would hold more than
    /// [`MAX_LADDER_LEN`] rungs.
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, ValidationError> {
        for (field, value) in [("min", min), ("max", max), ("step", step)] {
            if !value.is_finite() {
                return Err(ValidationError::LadderNotFinite { field });
            }
        }
        if min <= 0.0 {
            return Err(ValidationError::LadderMinNotPositive { min });
        }
        if step <= 0.0 {
            return Err(ValidationError::LadderStepNotPositive { step });
        }
        if max < min {
            return Err(ValidationError::LadderMaxBelowMin { min, max });
        }
        let steps = rung_steps(min, max, step);
        if steps >= MAX_LADDER_LEN as f64 {
            return Err(ValidationError::LadderTooLong {
                len: steps + 1.0,
                max: MAX_LADDER_LEN,
            });
        }
        Ok(Self::from_bounds(min, max, step))
    }

    fn from_bounds(min: f64, max: f64, step: f64) -> Self {
        // Callers keep this within 0..MAX_LADDER_LEN.
        let count = rung_steps(min, max, step) as usize;
        let speeds = (0..=count).map(|index| min + step * index as f64).collect();
        Self { speeds }
    }

    #[must_use]
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.speeds.first().copied().unwrap_or(BASELINE_SPEED)
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.speeds.last().copied().unwrap_or(BASELINE_SPEED)
    }

    /// Ladder value nearest to `rate`; the lower value wins an exact tie.
    #[must_use]
    pub fn closest(&self, rate: f64) -> f64 {
        let mut best = self.min();
        for &speed in self.speeds.iter().skip(1) {
            if (speed - rate).abs() < (best - rate).abs() {
                best = speed;
            }
        }
        best
    }

    /// One rung above the first ladder value `>= rate`, saturating at the top.
    #[must_use]
    pub fn next(&self, rate: f64) -> f64 {
        let last = self.len().saturating_sub(1);
        let index = self
            .position_at_or_above(rate)
            .map_or(last, |index| index.saturating_add(1).min(last));
        self.at(index)
    }

    /// One rung below the first ladder value `>= rate`, saturating at the bottom.
    ///
    /// A rate above every rung is treated as sitting one past the top, so it
    /// steps down to the maximum.
    #[must_use]
    pub fn prev(&self, rate: f64) -> f64 {
        let index = self
            .position_at_or_above(rate)
            .unwrap_or_else(|| self.len())
            .saturating_sub(1);
        self.at(index)
    }

    #[must_use]
    pub const fn reset(&self) -> f64 {
        BASELINE_SPEED
    }

    #[must_use]
    pub fn apply(&self, op: SpeedOp, rate: f64) -> f64 {
        match op {
            SpeedOp::Increase => self.next(rate),
            SpeedOp::Decrease => self.prev(rate),
            SpeedOp::Reset => self.reset(),
        }
    }

    fn position_at_or_above(&self, rate: f64) -> Option<usize> {
        self.speeds.iter().position(|&speed| speed >= rate)
    }

    fn at(&self, index: usize) -> f64 {
        self.speeds.get(index).copied().unwrap_or(BASELINE_SPEED)
    }
}
