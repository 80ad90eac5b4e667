use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw pixel sample as written by the acquisition firmware
pub type Pixel = u16;

/// One channel of a .dat image (rows x columns, row 0 = first scanned line)
pub type PixelImage = Array2<Pixel>;

/// A 2-component physical quantity (offset, size) or pixel count
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XY2D {
    pub x: f64,
    pub y: f64,
}

impl XY2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Header layout versions understood by the decoder.
///
/// The token is the first header line reduced to its alphanumeric
/// characters, e.g. `[Paramco32]` becomes `Paramco32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileVersion {
    /// Current image header
    Paramco32,
    /// Legacy image header
    Parameter,
    /// Legacy spectroscopy header
    #[serde(rename = "ParVERT30")]
    ParVert30,
    /// Current spectroscopy header
    #[serde(rename = "ParVERT32")]
    ParVert32,
}

impl FileVersion {
    pub fn token(&self) -> &'static str {
        match self {
            FileVersion::Paramco32 => "Paramco32",
            FileVersion::Parameter => "Parameter",
            FileVersion::ParVert30 => "ParVERT30",
            FileVersion::ParVert32 => "ParVERT32",
        }
    }

    pub fn is_spectroscopy(&self) -> bool {
        matches!(self, FileVersion::ParVert30 | FileVersion::ParVert32)
    }
}

impl FromStr for FileVersion {
    type Err = CreatecError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "Paramco32" => Ok(FileVersion::Paramco32),
            "Parameter" => Ok(FileVersion::Parameter),
            "ParVERT30" => Ok(FileVersion::ParVert30),
            "ParVERT32" => Ok(FileVersion::ParVert32),
            other => Err(CreatecError::UnsupportedFormatVersion(other.to_string())),
        }
    }
}

impl std::fmt::Display for FileVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Error types for Createc file decoding
#[derive(Debug, thiserror::Error)]
pub enum CreatecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Binary reader: input truncated, header needs {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    #[error("Metadata: unsupported format version '{0}'")]
    UnsupportedFormatVersion(String),

    #[error("Spectroscopy header: variant '{variant}' has no value columns for {version}")]
    UnsupportedOutputVariant { version: String, variant: String },

    #[error("Field extraction: required key '{0}' is missing")]
    MissingField(String),

    #[error("Field extraction: key '{key}' has malformed value '{value}'")]
    MalformedField { key: String, value: String },

    #[error("Image payload: decompression failed: {0}")]
    Decompression(String),

    #[error("Image payload: expected {expected} samples after the sentinel, found {actual}")]
    ShortPayload { expected: usize, actual: usize },

    #[error("Spectroscopy header: {0}")]
    MalformedSpecHeader(String),

    #[error("Spectroscopy table: row {row} has {found} fields, expected {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Spectroscopy table: row {row}, column '{column}' has non-numeric value '{value}'")]
    MalformedTableValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Timestamp: cannot derive a date from file name '{0}'")]
    InvalidFileName(String),

    #[error("Format constants: {0}")]
    Constants(String),
}

/// Result type for Createc decoding
pub type CreatecResult<T> = Result<T, CreatecError>;
