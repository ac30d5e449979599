//! Regularly spaced grid axes and the channel identifier range.

use serde::{Deserialize, Serialize};

use crate::error::{PdfError, Result};

/// Relative tolerance used to snap `(x - min) / step` onto an integer.
///
/// Decimal steps such as 0.05 are not exact in binary, so a coordinate
/// sitting on a grid point can otherwise land just below it.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of points along a single axis.
pub const MAX_AXIS_POINTS: usize = 1 << 24;

/// A regularly spaced 1-D axis described by `(min, step, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub min: f64,
    pub step: f64,
    pub max: f64,
}

/// Position of a coordinate within an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPosition {
    /// Index of the grid point at or below the coordinate.
    pub lower: usize,
    /// Index of the upper neighbour, clamped to the last point.
    pub upper: usize,
    /// Fractional offset from `lower`, in `[0, 1]`.
    pub fraction: f64,
}

impl GridAxis {
    /// Create a validated axis.
    ///
    /// # Errors
    /// * If any bound is not finite
    /// * If `step <= 0` or `max <= min`
    /// * If the axis has fewer than two points
    pub fn new(min: f64, step: f64, max: f64) -> Result<Self> {
        let axis = Self { min, step, max };
        axis.validate()?;
        Ok(axis)
    }

    /// Check the axis invariants.
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.step.is_finite() && self.max.is_finite()) {
            return Err(PdfError::invalid_config(format!(
                "axis bounds must be finite: {:?}",
                self
            )));
        }
        if self.step <= 0.0 {
            return Err(PdfError::invalid_config(format!(
                "axis step must be > 0, got {}",
                self.step
            )));
        }
        if self.max <= self.min {
            return Err(PdfError::invalid_config(format!(
                "axis max ({}) must be greater than min ({})",
                self.max, self.min
            )));
        }
        let steps = (self.max - self.min) / self.step;
        if !steps.is_finite() || steps >= MAX_AXIS_POINTS as f64 {
            return Err(PdfError::invalid_config(format!(
                "axis {:?} has more than {} grid points",
                self, MAX_AXIS_POINTS
            )));
        }
        if self.point_count() < 2 {
            return Err(PdfError::invalid_config(format!(
                "axis {:?} must span at least two grid points",
                self
            )));
        }
        Ok(())
    }

    /// Number of grid points, `floor((max - min) / step) + 1`.
    ///
    /// Saturates for axes that fail [`validate`](Self::validate).
    pub fn point_count(&self) -> usize {
        let (steps, _) = self.snapped_ratio(self.max);
        (steps.max(0.0) as usize).saturating_add(1)
    }

    /// Index of the last grid point.
    pub fn last_index(&self) -> usize {
        self.point_count() - 1
    }

    /// Whether `x` lies within `[min, max]`. NaN is never contained.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Coordinate of grid point `i`.
    pub fn value_at(&self, i: usize) -> f64 {
        i as f64 * self.step + self.min
    }

    /// Index of the grid point at or below `x`.
    ///
    /// Callers must check [`contains`](Self::contains) first.
    pub fn lower_index(&self, x: f64) -> usize {
        let (steps, _) = self.snapped_ratio(x);
        (steps.max(0.0) as usize).min(self.last_index())
    }

    /// Grid-aligned coordinate at or below `x`.
    pub fn lower_value(&self, x: f64) -> f64 {
        self.value_at(self.lower_index(x))
    }

    /// Offset of `x` from its lower grid point, in units of `step`.
    ///
    /// Exactly zero on a grid point.
    pub fn fraction(&self, x: f64) -> f64 {
        let (_, on_point) = self.snapped_ratio(x);
        if on_point {
            return 0.0;
        }
        ((x - self.lower_value(x)) / self.step).clamp(0.0, 1.0)
    }

    /// Lower index, clamped upper neighbour and fraction for `x`.
    ///
    /// At the last grid point the upper neighbour equals the lower one, so the
    /// interpolation cell has zero width and never reads past the axis.
    pub fn locate(&self, x: f64) -> AxisPosition {
        let lower = self.lower_index(x);
        AxisPosition {
            lower,
            upper: (lower + 1).min(self.last_index()),
            fraction: self.fraction(x),
        }
    }

    /// `(floor((x - min) / step), landed_on_point)` with near-integer ratios snapped.
    fn snapped_ratio(&self, x: f64) -> (f64, bool) {
        let ratio = (x - self.min) / self.step;
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= SNAP_TOLERANCE * nearest.abs().max(1.0) {
            (nearest, true)
        } else {
            (ratio.floor(), false)
        }
    }
}

/// Inclusive range of valid channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: i32,
    pub max: i32,
}

impl ChannelRange {
    /// Create a validated channel range.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max < self.min {
            return Err(PdfError::invalid_config(format!(
                "channel range max ({}) must not be below min ({})",
                self.max, self.min
            )));
        }
        Ok(())
    }

    pub fn contains(&self, channel: i32) -> bool {
        channel >= self.min && channel <= self.max
    }

    /// Number of valid channel identifiers.
    pub fn len(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }

    /// Check `channel`, failing with [`PdfError::ChannelOutOfRange`].
    pub fn check(&self, channel: i32) -> Result<()> {
        if self.contains(channel) {
            Ok(())
        } else {
            Err(PdfError::ChannelOutOfRange {
                channel,
                min: self.min,
                max: self.max,
            })
        }
    }
}
