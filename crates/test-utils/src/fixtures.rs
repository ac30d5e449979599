//! Common axis fixtures for ar39-pdf tests.
//!
//! Axes are plain `(min, step, max)` tuples so this crate stays independent of
//! the library under test.

/// An axis as `(min, step, max)`.
pub type AxisSpec = (f64, f64, f64);

/// The GERDA Phase II+ lookup-table axes.
pub mod gerda {
    use super::AxisSpec;

    /// Energy in keV.
    pub const ENERGY: AxisSpec = (0.0, 0.1, 565.0);

    /// Full charge-collection depth in mm.
    pub const FCCD: AxisSpec = (0.65, 0.05, 2.4);

    /// Dead-layer fraction.
    pub const DLF: AxisSpec = (0.0, 0.1, 1.0);

    /// Valid channel identifiers (inclusive).
    pub const CHANNELS: (i32, i32) = (0, 41);

    /// Channels with a lookup table in the GERDA deployment.
    pub const DEPLOYED_CHANNELS: [i32; 38] = [
        0, 1, 2, 3, 4, 5, 7, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
        26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 37, 38, 39, 40,
    ];
}

/// Small axes that keep generated grids in the kilobyte range.
pub mod small {
    use super::AxisSpec;

    /// 21 energy points.
    pub const ENERGY: AxisSpec = (0.0, 0.5, 10.0);

    /// Same spacing as the GERDA FCCD axis, 8 points.
    pub const FCCD: AxisSpec = (0.65, 0.05, 1.0);

    /// Same as the GERDA DLF axis, 11 points.
    pub const DLF: AxisSpec = (0.0, 0.1, 1.0);

    /// Valid channel identifiers (inclusive).
    pub const CHANNELS: (i32, i32) = (0, 5);
}

/// Number of points on an axis, `floor((max - min) / step) + 1`.
///
/// Snaps near-integer ratios the same way the library does.
pub fn point_count(axis: AxisSpec) -> usize {
    let (min, step, max) = axis;
    let ratio = (max - min) / step;
    let nearest = ratio.round();
    let steps = if (ratio - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        nearest
    } else {
        ratio.floor()
    };
    steps as usize + 1
}

/// Coordinate of grid point `i` on `axis`.
pub fn axis_value(axis: AxisSpec, i: usize) -> f64 {
    i as f64 * axis.1 + axis.0
}
