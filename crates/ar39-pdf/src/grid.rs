//! Dense 3-D density grid.

use crate::config::GridShape;
use crate::error::{PdfError, Result};

/// Density samples over (energy, FCCD, DLF) for one channel.
///
/// Values are stored in a single row-major buffer with energy varying
/// slowest and DLF fastest, matching the lookup-table file layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    shape: GridShape,
    values: Vec<f64>,
}

impl Grid {
    /// Build a grid from a flat value buffer.
    ///
    /// # Errors
    /// * If `values.len()` differs from the number of cells in `shape`
    pub fn from_values(shape: GridShape, values: Vec<f64>) -> Result<Self> {
        if values.len() != shape.len() {
            return Err(PdfError::ShapeMismatch {
                expected: shape.len(),
                found: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    /// Build a grid by evaluating `f(e, f, d)` at every cell index.
    pub fn from_fn(shape: GridShape, mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(shape.len());
        for e in 0..shape.n_energy {
            for fc in 0..shape.n_fccd {
                for d in 0..shape.n_dlf {
                    values.push(f(e, fc, d));
                }
            }
        }
        Self { shape, values }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Value of cell `(e, f, d)`, or `None` if any index is past its axis.
    pub fn get(&self, e: usize, f: usize, d: usize) -> Option<f64> {
        if e >= self.shape.n_energy || f >= self.shape.n_fccd || d >= self.shape.n_dlf {
            return None;
        }
        Some(self.values[self.shape.index(e, f, d)])
    }

    /// Value of cell `(e, f, d)` without the per-axis check.
    ///
    /// Panics if the flat index is past the buffer.
    #[inline]
    pub(crate) fn at(&self, e: usize, f: usize, d: usize) -> f64 {
        self.values[self.shape.index(e, f, d)]
    }

    /// The raw value buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Approximate heap size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<f64>()
    }
}
