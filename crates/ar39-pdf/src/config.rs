//! Configuration for grid axes and lookup-table resources.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::axis::{ChannelRange, GridAxis};
use crate::error::{PdfError, Result};

/// Default directory holding the per-channel lookup tables.
pub const DEFAULT_DATA_DIR: &str = "lookup";

/// Default resource file name prefix, followed by the channel number.
pub const DEFAULT_FILE_PREFIX: &str = "ar39-pdf-ch";

/// Default resource file extension.
pub const DEFAULT_FILE_EXTENSION: &str = "dat";

/// Upper bound on the cells of one channel grid (2 GiB of `f64`).
pub const MAX_GRID_CELLS: usize = 1 << 28;

/// Axes of the 3-D lookup grid plus the allowed channel identifiers.
///
/// These must match what the upstream Monte-Carlo pipeline wrote: the
/// lookup tables carry no header, so a mismatch silently misreads data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfiguration {
    /// Energy axis in keV.
    pub energy: GridAxis,
    /// Full charge-collection depth axis in mm.
    pub fccd: GridAxis,
    /// Dead-layer fraction axis.
    pub dlf: GridAxis,
    /// Valid channel identifiers.
    pub channels: ChannelRange,
}

impl Default for AxisConfiguration {
    fn default() -> Self {
        Self {
            energy: GridAxis {
                min: 0.0,
                step: 0.1,
                max: 565.0,
            },
            fccd: GridAxis {
                min: 0.65,
                step: 0.05,
                max: 2.4,
            },
            dlf: GridAxis {
                min: 0.0,
                step: 0.1,
                max: 1.0,
            },
            channels: ChannelRange { min: 0, max: 41 },
        }
    }
}

impl AxisConfiguration {
    /// Validate every axis and the channel range.
    pub fn validate(&self) -> Result<()> {
        self.energy
            .validate()
            .map_err(|e| PdfError::invalid_config(format!("energy axis: {}", e)))?;
        self.fccd
            .validate()
            .map_err(|e| PdfError::invalid_config(format!("FCCD axis: {}", e)))?;
        self.dlf
            .validate()
            .map_err(|e| PdfError::invalid_config(format!("DLF axis: {}", e)))?;

        let shape = self.shape();
        match shape.checked_len() {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(PdfError::invalid_config(format!(
                    "grid {}x{}x{} exceeds {} cells",
                    shape.n_energy, shape.n_fccd, shape.n_dlf, MAX_GRID_CELLS
                )))
            }
        }

        self.channels.validate()
    }

    /// Grid dimensions `(n_energy, n_fccd, n_dlf)`.
    pub fn shape(&self) -> GridShape {
        GridShape {
            n_energy: self.energy.point_count(),
            n_fccd: self.fccd.point_count(),
            n_dlf: self.dlf.point_count(),
        }
    }
}

/// Dimensions of a dense 3-D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub n_energy: usize,
    pub n_fccd: usize,
    pub n_dlf: usize,
}

impl GridShape {
    pub fn new(n_energy: usize, n_fccd: usize, n_dlf: usize) -> Self {
        Self {
            n_energy,
            n_fccd,
            n_dlf,
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.n_energy * self.n_fccd * self.n_dlf
    }

    /// Total number of cells, or `None` on overflow.
    pub fn checked_len(&self) -> Option<usize> {
        self.n_energy
            .checked_mul(self.n_fccd)?
            .checked_mul(self.n_dlf)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat row-major index of cell `(e, f, d)`, energy slowest and DLF fastest.
    #[inline]
    pub fn index(&self, e: usize, f: usize, d: usize) -> usize {
        (e * self.n_fccd + f) * self.n_dlf + d
    }
}

/// Configuration for locating and shaping the lookup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Directory holding one lookup table per channel.
    pub data_dir: PathBuf,

    /// File name prefix; the channel number follows it.
    pub file_prefix: String,

    /// File extension, without the dot.
    pub file_extension: String,

    /// Grid axes shared by every channel.
    pub axes: AxisConfiguration,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            axes: AxisConfiguration::default(),
        }
    }
}

impl PdfConfig {
    /// Create a default configuration reading tables from `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `AR39_PDF_CONFIG` names a YAML or JSON file that replaces the defaults;
    /// `AR39_PDF_DATA_DIR`, `AR39_PDF_FILE_PREFIX` and `AR39_PDF_FILE_EXTENSION`
    /// then override individual fields.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("AR39_PDF_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(val) = std::env::var("AR39_PDF_DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("AR39_PDF_FILE_PREFIX") {
            config.file_prefix = val;
        }

        if let Ok(val) = std::env::var("AR39_PDF_FILE_EXTENSION") {
            config.file_extension = val.trim_start_matches('.').to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML (`.yaml`, `.yml`) or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PdfError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            _ => serde_json::from_str(&text)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.file_extension.contains(std::path::MAIN_SEPARATOR)
            || self.file_prefix.contains(std::path::MAIN_SEPARATOR)
        {
            return Err(PdfError::invalid_config(
                "file_prefix and file_extension must not contain path separators",
            ));
        }
        self.axes.validate()
    }

    /// Path of the lookup table for `channel`.
    pub fn resource_path(&self, channel: i32) -> PathBuf {
        let name = if self.file_extension.is_empty() {
            format!("{}{}", self.file_prefix, channel)
        } else {
            format!("{}{}.{}", self.file_prefix, channel, self.file_extension)
        };
        self.data_dir.join(name)
    }
}
