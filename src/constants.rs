//! Process-wide format constants for Createc files
//!
//! The table is a human-editable JSON document. A default copy is compiled
//! into the crate; `CREATEC_GLOBAL_CONST` may point at a replacement.

use crate::types::{CreatecError, CreatecResult, FileVersion};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Environment variable naming an alternative constants document
pub const CONSTANTS_ENV_VAR: &str = "CREATEC_GLOBAL_CONST";

const DEFAULT_CONSTANTS: &str = include_str!("createc_global_const.json");

static GLOBAL_CONSTANTS: OnceLock<FormatConstants> = OnceLock::new();

/// Numeric encoding of the inflated image samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelEncoding {
    #[serde(rename = "<u2")]
    U16Le,
    #[serde(rename = ">u2")]
    U16Be,
}

impl PixelEncoding {
    pub fn decode(&self, bytes: [u8; 2]) -> u16 {
        match self {
            PixelEncoding::U16Le => u16::from_le_bytes(bytes),
            PixelEncoding::U16Be => u16::from_be_bytes(bytes),
        }
    }
}

/// Layout and unit constants shared by every decode call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConstants {
    /// Length of the header region in bytes
    pub header_len: usize,
    /// Byte offset where the payload starts
    pub payload_offset: usize,
    /// Nominal number of text lines in the header
    pub header_total_lines: usize,
    pub pixel_dtype: PixelEncoding,
    /// Added to the two-digit year found in file names
    pub year_epoch: i32,
    /// Full-scale XY output voltage
    pub xy_volt: f64,
    /// XY DAC resolution in bits
    pub xy_bits: u32,
    pub image_channels: HashMap<FileVersion, Vec<String>>,
    pub spec_index_header: String,
    pub spec_value_headers: HashMap<FileVersion, HashMap<String, Vec<String>>>,
    pub spec_channels: HashMap<FileVersion, Vec<String>>,
    pub spec_delimiter: String,
}

impl FormatConstants {
    /// Parse and validate a constants document
    pub fn from_json_str(json: &str) -> CreatecResult<Self> {
        let constants: FormatConstants = serde_json::from_str(json)
            .map_err(|e| CreatecError::Constants(format!("Failed to parse constants: {}", e)))?;
        constants.validate()?;
        Ok(constants)
    }

    /// Load a constants document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> CreatecResult<Self> {
        let path = path.as_ref();
        log::info!("Loading format constants from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
            CreatecError::Constants(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// The constants compiled into the crate
    pub fn embedded() -> CreatecResult<Self> {
        Self::from_json_str(DEFAULT_CONSTANTS)
    }

    /// Process-wide constants, loaded on first use.
    ///
    /// Reads the document named by `CREATEC_GLOBAL_CONST` when set,
    /// otherwise the embedded default.
    pub fn global() -> CreatecResult<&'static FormatConstants> {
        if let Some(constants) = GLOBAL_CONSTANTS.get() {
            return Ok(constants);
        }

        let loaded = match std::env::var_os(CONSTANTS_ENV_VAR) {
            Some(path) => Self::from_path(path)?,
            None => Self::embedded()?,
        };
        // a concurrent first call may already have stored its copy
        Ok(GLOBAL_CONSTANTS.get_or_init(|| loaded))
    }

    /// Install explicit constants before the first decode
    pub fn install_global(constants: FormatConstants) -> CreatecResult<()> {
        constants.validate()?;
        GLOBAL_CONSTANTS
            .set(constants)
            .map_err(|_| CreatecError::Constants("Constants already initialized".to_string()))
    }

    fn validate(&self) -> CreatecResult<()> {
        if self.header_len == 0 {
            return Err(CreatecError::Constants(
                "header_len must be greater than zero".to_string(),
            ));
        }
        if self.spec_delimiter.len() != 1 {
            return Err(CreatecError::Constants(format!(
                "spec_delimiter must be a single byte, got {:?}",
                self.spec_delimiter
            )));
        }
        if self.xy_bits >= 64 {
            return Err(CreatecError::Constants(format!(
                "xy_bits out of range: {}",
                self.xy_bits
            )));
        }
        for version in self.image_channels.keys() {
            if version.is_spectroscopy() {
                return Err(CreatecError::Constants(format!(
                    "image_channels lists spectroscopy version {}",
                    version
                )));
            }
        }
        for version in self.spec_channels.keys().chain(self.spec_value_headers.keys()) {
            if !version.is_spectroscopy() {
                return Err(CreatecError::Constants(format!(
                    "spectroscopy tables list image version {}",
                    version
                )));
            }
        }
        Ok(())
    }

    /// Channel names of an image version, in bit order
    pub fn image_channel_names(&self, version: FileVersion) -> CreatecResult<&[String]> {
        self.image_channels
            .get(&version)
            .map(Vec::as_slice)
            .ok_or_else(|| CreatecError::UnsupportedFormatVersion(version.to_string()))
    }

    /// Optional channel names of a spectroscopy version, in bit order
    pub fn spec_channel_names(&self, version: FileVersion) -> CreatecResult<&[String]> {
        self.spec_channels
            .get(&version)
            .map(Vec::as_slice)
            .ok_or_else(|| CreatecError::UnsupportedFormatVersion(version.to_string()))
    }

    /// Voltage/height columns for a spectroscopy version and output variant
    pub fn spec_value_names(
        &self,
        version: FileVersion,
        variant: &str,
    ) -> CreatecResult<&[String]> {
        let variants = self
            .spec_value_headers
            .get(&version)
            .ok_or_else(|| CreatecError::UnsupportedFormatVersion(version.to_string()))?;
        variants
            .get(variant)
            .map(Vec::as_slice)
            .ok_or_else(|| CreatecError::UnsupportedOutputVariant {
                version: version.to_string(),
                variant: variant.to_string(),
            })
    }

    /// Rejects versions that have no entry for the given file kind
    pub fn ensure_image_version(&self, version: FileVersion) -> CreatecResult<()> {
        self.image_channel_names(version).map(|_| ())
    }

    pub fn ensure_spec_version(&self, version: FileVersion) -> CreatecResult<()> {
        self.spec_channel_names(version)?;
        if !self.spec_value_headers.contains_key(&version) {
            return Err(CreatecError::UnsupportedFormatVersion(version.to_string()));
        }
        Ok(())
    }

    pub fn spec_delimiter_byte(&self) -> u8 {
        self.spec_delimiter.as_bytes().first().copied().unwrap_or(b'\t')
    }

    /// Volts per XY DAC step
    pub fn xy_dac_scale(&self) -> f64 {
        self.xy_volt / 2f64.powi(self.xy_bits as i32)
    }
}
