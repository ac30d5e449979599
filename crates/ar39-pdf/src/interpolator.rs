//! Trilinear interpolation of the per-channel density grids.
//!
//! Queries are validated against the axis bounds, the channel grid is fetched
//! from the [`GridStore`], and the eight corners of the enclosing cell are
//! blended along energy, then FCCD, then DLF.
//!
//! At an axis maximum the upper neighbour is clamped to the last grid point,
//! so the enclosing cell has zero width along that axis and the result is the
//! boundary value. The same rule holds on all three axes.
//!
//! References
//! * https://en.wikipedia.org/wiki/Trilinear_interpolation

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::axis::{AxisPosition, GridAxis};
use crate::config::AxisConfiguration;
use crate::error::{Parameter, PdfError, Result};
use crate::grid::Grid;
use crate::loader::GridLoader;
use crate::store::GridStore;

/// A single density query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityQuery {
    pub channel: i32,
    pub energy_kev: f64,
    pub fccd_mm: f64,
    pub dlf: f64,
}

impl DensityQuery {
    pub fn new(channel: i32, energy_kev: f64, fccd_mm: f64, dlf: f64) -> Self {
        Self {
            channel,
            energy_kev,
            fccd_mm,
            dlf,
        }
    }
}

impl fmt::Display for DensityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ar39_pdf({}, {}, {}, {})",
            self.channel, self.energy_kev, self.fccd_mm, self.dlf
        )
    }
}

/// Receives each diagnosed query together with its result.
pub type DiagnosticsHook = Arc<dyn Fn(&DensityQuery, f64) + Send + Sync>;

/// Public entry point: density lookups backed by a [`GridStore`].
pub struct Interpolator<L> {
    store: Arc<GridStore<L>>,
    hook: Option<DiagnosticsHook>,
}

impl<L> Clone for Interpolator<L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hook: self.hook.clone(),
        }
    }
}

impl<L: GridLoader> Interpolator<L> {
    /// Create an interpolator owning a fresh store.
    pub fn new(loader: L, axes: AxisConfiguration) -> Result<Self> {
        Ok(Self::with_store(Arc::new(GridStore::new(loader, axes)?)))
    }

    /// Create an interpolator over an existing, possibly shared, store.
    pub fn with_store(store: Arc<GridStore<L>>) -> Self {
        Self { store, hook: None }
    }

    /// Send diagnosed queries to `hook` in addition to the tracing output.
    pub fn with_diagnostics_hook(mut self, hook: DiagnosticsHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn store(&self) -> &Arc<GridStore<L>> {
        &self.store
    }

    pub fn axes(&self) -> &AxisConfiguration {
        self.store.axes()
    }

    /// Density for `channel` at (`energy_kev`, `fccd_mm`, `dlf`).
    ///
    /// # Errors
    /// * [`PdfError::OutOfRange`] for energy, FCCD or DLF outside their axis,
    ///   checked in that order before any grid access
    /// * [`PdfError::ChannelOutOfRange`] for an unknown channel
    /// * Loader errors on the first request for a channel
    pub fn density(&self, channel: i32, energy_kev: f64, fccd_mm: f64, dlf: f64) -> Result<f64> {
        self.density_with(channel, energy_kev, fccd_mm, dlf, false)
    }

    /// Same as [`density`](Self::density), optionally emitting the query and
    /// its result as diagnostics.
    pub fn density_with(
        &self,
        channel: i32,
        energy_kev: f64,
        fccd_mm: f64,
        dlf: f64,
        diagnostics: bool,
    ) -> Result<f64> {
        let query = DensityQuery::new(channel, energy_kev, fccd_mm, dlf);
        let cell = self.locate(&query)?;
        let grid = self.store.get(channel)?;
        let value = cell.interpolate(&grid);

        if diagnostics {
            self.emit(&query, value);
        }
        Ok(value)
    }

    /// Evaluate a [`DensityQuery`].
    pub fn evaluate(&self, query: &DensityQuery) -> Result<f64> {
        self.density(query.channel, query.energy_kev, query.fccd_mm, query.dlf)
    }

    /// Evaluate many `(energy_kev, fccd_mm, dlf)` points for one channel.
    ///
    /// Every point is validated before the grid is fetched; the first invalid
    /// point fails the whole batch.
    pub fn density_many(&self, channel: i32, points: &[(f64, f64, f64)]) -> Result<Vec<f64>> {
        let cells = points
            .iter()
            .map(|&(e, f, d)| self.locate(&DensityQuery::new(channel, e, f, d)))
            .collect::<Result<Vec<_>>>()?;

        let grid = self.store.get(channel)?;
        Ok(cells.iter().map(|cell| cell.interpolate(&grid)).collect())
    }

    fn locate(&self, query: &DensityQuery) -> Result<Cell> {
        let axes = self.store.axes();
        Ok(Cell {
            energy: locate_on(&axes.energy, Parameter::Energy, query.energy_kev)?,
            fccd: locate_on(&axes.fccd, Parameter::Fccd, query.fccd_mm)?,
            dlf: locate_on(&axes.dlf, Parameter::Dlf, query.dlf)?,
        })
    }

    fn emit(&self, query: &DensityQuery, value: f64) {
        info!(
            target: "ar39_pdf::diagnostics",
            channel = query.channel,
            energy_kev = query.energy_kev,
            fccd_mm = query.fccd_mm,
            dlf = query.dlf,
            value,
            "{} = {}",
            query,
            value
        );
        if let Some(hook) = &self.hook {
            hook(query, value);
        }
    }
}

fn locate_on(axis: &GridAxis, parameter: Parameter, value: f64) -> Result<AxisPosition> {
    if !axis.contains(value) {
        return Err(PdfError::out_of_range(parameter, value, axis.min, axis.max));
    }
    Ok(axis.locate(value))
}

/// The grid cell enclosing a validated query point.
#[derive(Debug, Clone, Copy)]
struct Cell {
    energy: AxisPosition,
    fccd: AxisPosition,
    dlf: AxisPosition,
}

impl Cell {
    fn interpolate(&self, grid: &Grid) -> f64 {
        let (e0, e1) = (self.energy.lower, self.energy.upper);
        let (f0, f1) = (self.fccd.lower, self.fccd.upper);
        let (d0, d1) = (self.dlf.lower, self.dlf.upper);

        let corners = [
            grid.at(e0, f0, d0),
            grid.at(e1, f0, d0),
            grid.at(e0, f0, d1),
            grid.at(e1, f0, d1),
            grid.at(e0, f1, d0),
            grid.at(e1, f1, d0),
            grid.at(e0, f1, d1),
            grid.at(e1, f1, d1),
        ];

        trilinear(
            &corners,
            self.energy.fraction,
            self.fccd.fraction,
            self.dlf.fraction,
        )
    }
}

/// Blend eight cell corners along energy, then FCCD, then DLF.
///
/// Corners are ordered `c[e + 2*d + 4*f]`, i.e.
/// `[c000, c100, c001, c101, c010, c110, c011, c111]` with indices
/// `(energy, fccd, dlf)`. Fractions must lie in `[0, 1]`.
#[inline]
pub fn trilinear(corners: &[f64; 8], e_d: f64, f_d: f64, d_d: f64) -> f64 {
    let [c000, c100, c001, c101, c010, c110, c011, c111] = *corners;

    let c00 = lerp(c000, c100, e_d);
    let c01 = lerp(c001, c101, e_d);
    let c10 = lerp(c010, c110, e_d);
    let c11 = lerp(c011, c111, e_d);

    let c0 = lerp(c00, c10, f_d);
    let c1 = lerp(c01, c11, f_d);

    lerp(c0, c1, d_d)
}

/// `a*(1-t) + b*t`; exact at `t == 0` and `t == 1`.
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridShape;
    use std::sync::Mutex;

    fn axes() -> AxisConfiguration {
        let mut axes = AxisConfiguration::default();
        axes.energy = GridAxis::new(0.0, 1.0, 4.0).unwrap();
        axes.fccd = GridAxis::new(0.65, 0.05, 0.85).unwrap();
        axes.dlf = GridAxis::new(0.0, 0.1, 1.0).unwrap();
        axes.channels.max = 5;
        axes
    }

    /// Linear in every coordinate, so interpolation reproduces it exactly.
    fn plane(e: f64, f: f64, d: f64) -> f64 {
        2.0 * e + 30.0 * f - 7.0 * d + 1.0
    }

    fn linear_loader(_: i32, axes: &AxisConfiguration) -> Result<Grid> {
        Ok(Grid::from_fn(axes.shape(), |i, j, k| {
            plane(
                axes.energy.value_at(i),
                axes.fccd.value_at(j),
                axes.dlf.value_at(k),
            )
        }))
    }

    fn interpolator() -> Interpolator<fn(i32, &AxisConfiguration) -> Result<Grid>> {
        Interpolator::new(
            linear_loader as fn(i32, &AxisConfiguration) -> Result<Grid>,
            axes(),
        )
        .unwrap()
    }

    #[test]
    fn test_trilinear_corners_and_center() {
        let corners = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(trilinear(&corners, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(trilinear(&corners, 1.0, 0.0, 0.0), 1.0);
        assert_eq!(trilinear(&corners, 0.0, 0.0, 1.0), 2.0);
        assert_eq!(trilinear(&corners, 0.0, 1.0, 0.0), 4.0);
        assert_eq!(trilinear(&corners, 1.0, 1.0, 1.0), 7.0);
        assert!((trilinear(&corners, 0.5, 0.5, 0.5) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_exact_at_grid_points() {
        let interp = interpolator();
        let axes = *interp.axes();
        let grid = interp.store().get(0).unwrap();
        let shape = grid.shape();

        for i in 0..shape.n_energy {
            for j in 0..shape.n_fccd {
                for k in 0..shape.n_dlf {
                    let value = interp
                        .density(
                            0,
                            axes.energy.value_at(i),
                            axes.fccd.value_at(j),
                            axes.dlf.value_at(k),
                        )
                        .unwrap();
                    assert_eq!(value, grid.get(i, j, k).unwrap(), "cell ({}, {}, {})", i, j, k);
                }
            }
        }
    }

    #[test]
    fn test_reproduces_linear_function() {
        let interp = interpolator();
        for &(e, f, d) in &[(0.5, 0.7, 0.25), (3.3, 0.81, 0.95), (1.01, 0.66, 0.05)] {
            let value = interp.density(1, e, f, d).unwrap();
            assert!((value - plane(e, f, d)).abs() < 1e-9, "({}, {}, {})", e, f, d);
        }
    }

    #[test]
    fn test_axis_maxima_return_boundary_values() {
        let interp = interpolator();
        let value = interp.density(0, 4.0, 0.85, 1.0).unwrap();
        assert!((value - plane(4.0, 0.85, 1.0)).abs() < 1e-9);

        let value = interp.density(0, 4.0, 0.7, 0.35).unwrap();
        assert!((value - plane(4.0, 0.7, 0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_validation_order() {
        let interp = interpolator();

        // Every coordinate is bad; energy is reported first.
        let err = interp.density(999, -1.0, 10.0, 1.5).unwrap_err();
        assert!(matches!(
            err,
            PdfError::OutOfRange {
                parameter: Parameter::Energy,
                ..
            }
        ));

        let err = interp.density(999, 1.0, 10.0, 1.5).unwrap_err();
        assert!(matches!(
            err,
            PdfError::OutOfRange {
                parameter: Parameter::Fccd,
                ..
            }
        ));

        let err = interp.density(999, 1.0, 0.7, 1.5).unwrap_err();
        assert!(matches!(
            err,
            PdfError::OutOfRange {
                parameter: Parameter::Dlf,
                ..
            }
        ));

        let err = interp.density(999, 1.0, 0.7, 0.5).unwrap_err();
        assert!(matches!(err, PdfError::ChannelOutOfRange { channel: 999, .. }));

        let err = interp.density(0, f64::NAN, 0.7, 0.5).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_validation_happens_before_grid_access() {
        let interp = interpolator();
        assert!(interp.density(0, -1.0, 0.7, 0.5).is_err());
        assert!(!interp.store().contains(0));
    }

    #[test]
    fn test_density_many_matches_single_queries() {
        let interp = interpolator();
        let points = [(0.5, 0.7, 0.25), (2.0, 0.75, 0.5), (4.0, 0.85, 1.0)];
        let values = interp.density_many(2, &points).unwrap();
        for (value, &(e, f, d)) in values.iter().zip(points.iter()) {
            assert_eq!(*value, interp.density(2, e, f, d).unwrap());
        }

        assert!(interp.density_many(2, &[(0.5, 0.7, 0.25), (9.0, 0.7, 0.25)]).is_err());
    }

    #[test]
    fn test_diagnostics_hook_only_when_enabled() {
        let seen: Arc<Mutex<Vec<(DensityQuery, f64)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let hook: DiagnosticsHook = Arc::new(move |query: &DensityQuery, value: f64| {
            sink.lock().unwrap().push((*query, value));
        });
        let interp = interpolator().with_diagnostics_hook(hook);

        let quiet = interp.density(0, 1.0, 0.7, 0.5).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        let loud = interp.density_with(0, 1.0, 0.7, 0.5, true).unwrap();
        assert_eq!(quiet, loud);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, DensityQuery::new(0, 1.0, 0.7, 0.5));
        assert_eq!(seen[0].1, loud);
    }

    #[test]
    fn test_evaluate_query() {
        let interp = interpolator();
        let query = DensityQuery::new(3, 2.5, 0.8, 0.3);
        assert_eq!(
            interp.evaluate(&query).unwrap(),
            interp.density(3, 2.5, 0.8, 0.3).unwrap()
        );
        assert_eq!(query.to_string(), "ar39_pdf(3, 2.5, 0.8, 0.3)");
    }

    #[test]
    fn test_shape_of_test_axes() {
        assert_eq!(axes().shape(), GridShape::new(5, 5, 11));
    }
}
