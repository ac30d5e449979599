//! Loading per-channel lookup tables into memory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::config::{AxisConfiguration, PdfConfig};
use crate::error::{PdfError, Result};
use crate::grid::Grid;

/// Source of fully populated grids, one per channel.
///
/// Implementations are called at most once per channel by
/// [`GridStore`](crate::GridStore) and must not return partial grids.
pub trait GridLoader: Send + Sync {
    /// Build the grid for an already validated `channel`.
    fn load(&self, channel: i32, axes: &AxisConfiguration) -> Result<Grid>;
}

impl<F> GridLoader for F
where
    F: Fn(i32, &AxisConfiguration) -> Result<Grid> + Send + Sync,
{
    fn load(&self, channel: i32, axes: &AxisConfiguration) -> Result<Grid> {
        self(channel, axes)
    }
}

/// Reads whitespace-delimited text lookup tables, one file per channel.
///
/// Files hold `n_energy * n_fccd * n_dlf` floats with energy varying slowest
/// and DLF fastest, and no header.
#[derive(Debug, Clone)]
pub struct TextGridLoader {
    config: PdfConfig,
}

impl TextGridLoader {
    /// Create a loader for `data_dir` with the default file naming.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&PdfConfig::with_data_dir(data_dir))
    }

    /// Create a loader using the naming and directory of `config`.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the lookup table for `channel`.
    pub fn resource_path(&self, channel: i32) -> PathBuf {
        self.config.resource_path(channel)
    }
}

impl GridLoader for TextGridLoader {
    #[instrument(skip(self, axes), fields(data_dir = %self.config.data_dir.display()))]
    fn load(&self, channel: i32, axes: &AxisConfiguration) -> Result<Grid> {
        let start = Instant::now();
        let path = self.resource_path(channel);

        let mut file = std::fs::File::open(&path).map_err(|source| PdfError::ResourceNotFound {
            channel,
            path: path.clone(),
            source,
        })?;
        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|source| PdfError::read_failed(channel, &path, source))?;

        let shape = axes.shape();
        let values = parse_values(&text, shape.len())
            .map_err(|reason| PdfError::malformed(channel, &path, reason))?;

        let grid = Grid::from_values(shape, values)?;

        info!(
            channel,
            path = %path.display(),
            values = grid.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded lookup table"
        );
        Ok(grid)
    }
}

/// Parse exactly `expected` floats from whitespace-delimited text.
///
/// Extra tokens are ignored with a warning; missing, unparsable or non-finite
/// tokens fail with a human-readable reason.
fn parse_values(text: &str, expected: usize) -> std::result::Result<Vec<f64>, String> {
    let mut values = Vec::with_capacity(expected);
    let mut tokens = text.split_ascii_whitespace();

    for token in tokens.by_ref().take(expected) {
        let value: f64 = token
            .parse()
            .map_err(|_| format!("value #{} ({:?}) is not a number", values.len(), token))?;
        if !value.is_finite() {
            return Err(format!(
                "value #{} ({:?}) is not a finite number",
                values.len(),
                token
            ));
        }
        values.push(value);
    }

    if values.len() < expected {
        return Err(format!(
            "expected {} values, found only {}",
            expected,
            values.len()
        ));
    }

    let trailing = tokens.count();
    if trailing > 0 {
        warn!(expected, trailing, "Ignoring trailing values in lookup table");
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridShape;

    #[test]
    fn test_parse_values_exact() {
        let values = parse_values("1 2.5\n-3e-2\t4\n", 4).unwrap();
        assert_eq!(values, vec![1.0, 2.5, -0.03, 4.0]);
    }

    #[test]
    fn test_parse_values_short_read() {
        let reason = parse_values("1 2 3", 4).unwrap_err();
        assert!(reason.contains("expected 4"), "{}", reason);
        assert!(reason.contains("only 3"), "{}", reason);
    }

    #[test]
    fn test_parse_values_bad_token() {
        let reason = parse_values("1 2 x 4", 4).unwrap_err();
        assert!(reason.contains("#2"), "{}", reason);
    }

    #[test]
    fn test_parse_values_rejects_non_finite() {
        for token in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let text = format!("1 2 {} 4", token);
            let reason = parse_values(&text, 4).unwrap_err();
            assert!(reason.contains("#2"), "{}", reason);
            assert!(reason.contains(token), "{}", reason);
        }
    }

    #[test]
    fn test_parse_values_ignores_trailing() {
        let values = parse_values("1 2 3 4 5 6", 4).unwrap();
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_resource_path_uses_config_naming() {
        let mut config = PdfConfig::with_data_dir("/tmp/tables");
        config.file_prefix = "pdf_".to_string();
        config.file_extension = String::new();
        let loader = TextGridLoader::from_config(&config);
        assert_eq!(loader.resource_path(12), PathBuf::from("/tmp/tables/pdf_12"));
    }

    #[test]
    fn test_closure_loader() {
        let loader = |channel: i32, axes: &AxisConfiguration| -> Result<Grid> {
            Ok(Grid::from_fn(axes.shape(), |_, _, _| channel as f64))
        };
        let mut axes = AxisConfiguration::default();
        axes.energy.max = 1.0;
        let grid = GridLoader::load(&loader, 4, &axes).unwrap();
        assert_eq!(grid.shape(), GridShape::new(11, 36, 11));
        assert_eq!(grid.get(0, 0, 0), Some(4.0));
    }
}
