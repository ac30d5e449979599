//! Ar-39 background PDF for GERDA germanium detectors.
//!
//! The density is tabulated per detector channel on a regular 3-D grid over
//! energy (keV), full charge-collection depth (FCCD, mm) and dead-layer
//! fraction (DLF). Grids are produced upstream by Monte-Carlo simulation and
//! stored as one whitespace-delimited text file per channel. This crate:
//!
//! - **Loads lazily**: a channel's table is read on its first query only
//! - **Caches once**: concurrent first queries share a single load
//! - **Interpolates**: trilinear interpolation inside the enclosing cell
//!
//! # Architecture
//!
//! ```text
//! Interpolator::density(channel, energy, fccd, dlf)
//!      │
//!      ├─► Validate energy, FCCD, DLF against AxisConfiguration
//!      │
//!      ├─► GridStore::get(channel)
//!      │         │
//!      │         ├─► Published: return cached Arc<Grid>
//!      │         │
//!      │         └─► Missing: check channel, GridLoader::load, publish
//!      │
//!      └─► Blend the 8 cell corners (energy, then FCCD, then DLF)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ar39_pdf::{AxisConfiguration, Interpolator, TextGridLoader};
//!
//! let pdf = Interpolator::new(TextGridLoader::new("lookup"), AxisConfiguration::default())?;
//! let density = pdf.density(0, 100.0, 1.0, 0.5)?;
//! ```

pub mod axis;
pub mod config;
pub mod error;
pub mod global;
pub mod grid;
pub mod interpolator;
pub mod loader;
pub mod store;

// Re-export commonly used types at crate root
pub use axis::{AxisPosition, ChannelRange, GridAxis};
pub use config::{AxisConfiguration, GridShape, PdfConfig};
pub use error::{Parameter, PdfError, Result};
pub use global::{ar39_pdf, ar39_pdf_with, default_interpolator};
pub use grid::Grid;
pub use interpolator::{trilinear, DensityQuery, DiagnosticsHook, Interpolator};
pub use loader::{GridLoader, TextGridLoader};
pub use store::{GridStore, StoreStats};
