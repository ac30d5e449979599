//! Error types for PDF lookup and grid loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Query parameter checked against its axis bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Energy in keV.
    Energy,
    /// Full charge-collection depth in mm.
    Fccd,
    /// Dead-layer fraction.
    Dlf,
}

impl Parameter {
    /// Get the parameter name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Fccd => "FCCD",
            Self::Dlf => "DLF",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while loading grids or evaluating the PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// A query coordinate lies outside its axis.
    #[error("{parameter} value {value} is out of the allowed range [{min}, {max}]")]
    OutOfRange {
        parameter: Parameter,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The channel identifier lies outside the configured channel range.
    #[error("channel value {channel} is out of the allowed range [{min}, {max}]")]
    ChannelOutOfRange { channel: i32, min: i32, max: i32 },

    /// The backing resource of a valid channel could not be opened.
    #[error("lookup table for channel {channel} not found at {}", path.display())]
    ResourceNotFound {
        channel: i32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing resource does not hold a complete grid.
    #[error("malformed lookup table for channel {channel} at {}: {reason}", path.display())]
    MalformedData {
        channel: i32,
        path: PathBuf,
        reason: String,
    },

    /// Grid values do not match the configured shape.
    #[error("grid shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Invalid axis or loader configuration.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Reading the resource failed after it was opened.
    #[error("failed reading lookup table for channel {channel} at {}: {source}", path.display())]
    Io {
        channel: i32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PdfError {
    /// Create an OutOfRange error.
    pub fn out_of_range(parameter: Parameter, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            parameter,
            value,
            min,
            max,
        }
    }

    /// Create a MalformedData error.
    pub fn malformed(channel: i32, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            channel,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify a read failure on an opened resource.
    ///
    /// Content that is not text is malformed data; anything else stays an IO error.
    pub fn read_failed(channel: i32, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::InvalidData {
            Self::malformed(channel, path, format!("not a text table: {}", source))
        } else {
            Self::Io {
                channel,
                path,
                source,
            }
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error rejects the query inputs rather than the data.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::ChannelOutOfRange { .. })
    }
}

impl From<serde_json::Error> for PdfError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<serde_yaml::Error> for PdfError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
