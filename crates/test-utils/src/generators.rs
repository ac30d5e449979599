//! Grid generators and lookup-table writers.

use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fixtures::{axis_value, point_count, AxisSpec};

/// Fixed random seed to support repeatable testing
pub const SEED: u64 = 0x4172_3339;

/// A density that is linear in every coordinate.
///
/// Trilinear interpolation reproduces it exactly anywhere inside the grid,
/// which makes it the reference for off-grid checks.
pub fn linear_density(energy: f64, fccd: f64, dlf: f64) -> f64 {
    0.01 * energy + 2.0 * fccd - 0.5 * dlf + 3.0
}

/// Creates grid values in file order (energy slowest, DLF fastest) by
/// evaluating `f` at every grid coordinate.
pub fn create_grid(
    energy: AxisSpec,
    fccd: AxisSpec,
    dlf: AxisSpec,
    f: impl Fn(f64, f64, f64) -> f64,
) -> Vec<f64> {
    let (ne, nf, nd) = (point_count(energy), point_count(fccd), point_count(dlf));
    let mut values = Vec::with_capacity(ne * nf * nd);
    for i in 0..ne {
        for j in 0..nf {
            for k in 0..nd {
                values.push(f(
                    axis_value(energy, i),
                    axis_value(fccd, j),
                    axis_value(dlf, k),
                ));
            }
        }
    }
    values
}

/// Creates grid values where cell `(i, j, k)` holds `i * 10000 + j * 100 + k`.
///
/// This pattern makes it easy to verify which cell a lookup landed on.
pub fn create_index_grid(n_energy: usize, n_fccd: usize, n_dlf: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(n_energy * n_fccd * n_dlf);
    for i in 0..n_energy {
        for j in 0..n_fccd {
            for k in 0..n_dlf {
                values.push((i * 10000 + j * 100 + k) as f64);
            }
        }
    }
    values
}

/// Creates `n` positive pseudo-random densities from a fixed seed.
pub fn create_random_grid(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.0..1.0e-3)).collect()
}

/// Writes `values` as a lookup table named `{prefix}{channel}.dat` in `dir`.
///
/// Values are written a few per line, the way the upstream producer does,
/// with full round-trip precision.
///
/// # Returns
///
/// The path of the written file.
pub fn write_grid_file(
    dir: &Path,
    prefix: &str,
    channel: i32,
    values: &[f64],
) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{}{}.dat", prefix, channel));
    let mut out = std::io::BufWriter::new(std::fs::File::create(&path)?);
    for line in values.chunks(11) {
        let line: Vec<String> = line.iter().map(|v| format!("{:e}", v)).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(path)
}
