//! Shared test utilities for the ar39-pdf workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Lookup-table generators and writers
//! - Axis fixtures for the GERDA and small test grids
//! - Temporary data directories
//! - Approximate float assertions and test logging
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, write_grid_file};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::{axis_value, gerda, point_count, small, AxisSpec};
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the real GERDA lookup tables are not available.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_lookup_dir;
///
/// #[test]
/// fn test_real_tables() {
///     let dir = require_lookup_dir!();
///     // Test code using dir...
/// }
/// ```
///
/// If no directory is found, the test will print a skip message and return early.
#[macro_export]
macro_rules! require_lookup_dir {
    () => {{
        match $crate::find_lookup_dir() {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: GERDA lookup tables not found. Set AR39_PDF_DATA_DIR or add lookup/."
                );
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Installs a `tracing` subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`; defaults to `ar39_pdf=debug`. Safe to call from every
/// test, only the first call installs the subscriber.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ar39_pdf=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
