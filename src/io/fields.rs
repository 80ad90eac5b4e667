use crate::io::metadata::{parse_value, MetadataTable};
use crate::types::{CreatecError, CreatecResult, FileVersion};
use serde::{Deserialize, Serialize};

/// A metadata field and the header keys that may carry it
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    /// Raw value under the first alias present in the table
    pub fn raw<'a>(&self, meta: &'a MetadataTable) -> CreatecResult<(&'static str, &'a str)> {
        self.aliases
            .iter()
            .find_map(|alias| meta.get(alias).map(|value| (*alias, value)))
            .ok_or_else(|| CreatecError::MissingField(self.primary_key().to_string()))
    }

    /// Parsed value, errors name the alias that was read
    pub fn parse<T: std::str::FromStr>(&self, meta: &MetadataTable) -> CreatecResult<T> {
        let (alias, raw) = self.raw(meta)?;
        parse_value(alias, raw)
    }

    pub fn primary_key(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or(self.name)
    }
}

/// Header keys of every field the decoder reads
pub mod keys {
    use super::FieldSpec;

    pub const PIXEL_X: FieldSpec = FieldSpec::new("pixel width", &["num.x"]);
    pub const PIXEL_Y: FieldSpec = FieldSpec::new("pixel height", &["num.y"]);
    pub const CHANNELS: FieldSpec = FieldSpec::new("channel count", &["channels"]);
    pub const CH_ZOFF: FieldSpec = FieldSpec::new("constant-height z offset", &["chmodezoff"]);
    pub const CH_BIAS: FieldSpec = FieldSpec::new("constant-height bias", &["chmodebias[mv]"]);
    pub const CHMODE: FieldSpec = FieldSpec::new("mode flags", &["chmode"]);
    pub const ROTATION: FieldSpec = FieldSpec::new("rotation", &["rotation"]);
    pub const DDELTA_X: FieldSpec = FieldSpec::new("scan-speed divisor", &["dx_div_ddelta-x"]);
    pub const DELTA_X_DAC: FieldSpec = FieldSpec::new("scan size", &["delta x", "delta x [dac]"]);
    pub const CHANNELS_CODE: FieldSpec =
        FieldSpec::new("channel-select code", &["channelselectval"]);
    pub const SCAN_YMODE: FieldSpec = FieldSpec::new("y-scan mode", &["scanymode"]);
    pub const X_PIEZO: FieldSpec = FieldSpec::new("x piezo constant", &["xpiezoconst"]);
    pub const Y_PIEZO: FieldSpec = FieldSpec::new("y piezo constant", &["ypiezoconst"]);
    pub const Z_PIEZO: FieldSpec = FieldSpec::new("z piezo constant", &["zpiezoconst"]);
    pub const BIAS: FieldSpec = FieldSpec::new("bias voltage", &["biasvoltage", "biasvolt.[mv]"]);
    pub const CURRENT: FieldSpec = FieldSpec::new("set-point current", &["fblogiset"]);

    // read on demand by the geometry calculator
    pub const OFFSET_X: FieldSpec = FieldSpec::new("x offset", &["scanrotoffx", "offsetx"]);
    pub const OFFSET_Y: FieldSpec = FieldSpec::new("y offset", &["scanrotoffy", "offsety"]);
    pub const LENGTH_X: FieldSpec = FieldSpec::new("x length", &["length x[a]"]);
    pub const LENGTH_Y: FieldSpec = FieldSpec::new("y length", &["length y[a]"]);
}

/// Typed view of the header fields shared by image and spectroscopy files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedFields {
    pub file_version: FileVersion,
    pub x_pixel: usize,
    pub y_pixel: usize,
    pub channels: usize,
    /// Constant-height z offset
    pub ch_zoff: f64,
    /// Constant-height bias in mV
    pub ch_bias: f64,
    pub chmode: i64,
    /// Scan rotation in degrees
    pub rotation: f64,
    pub ddelta_x: i64,
    /// Scan size in DAC units
    pub delta_x_dac: i64,
    pub channels_code: String,
    pub scan_ymode: i64,
    pub x_piezo_const: f64,
    pub y_piezo_const: f64,
    pub z_piezo_const: f64,
    pub bias: f64,
    pub current: f64,
}

impl TypedFields {
    /// The channel-select code as a bit pattern
    pub fn channel_select_bits(&self) -> CreatecResult<u64> {
        parse_value(keys::CHANNELS_CODE.primary_key(), &self.channels_code)
    }
}

/// Pulls the required fields out of a metadata table
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn extract(meta: &MetadataTable) -> CreatecResult<TypedFields> {
        let file_version = meta.version()?;

        let fields = TypedFields {
            file_version,
            x_pixel: keys::PIXEL_X.parse(meta)?,
            y_pixel: keys::PIXEL_Y.parse(meta)?,
            channels: keys::CHANNELS.parse(meta)?,
            ch_zoff: keys::CH_ZOFF.parse(meta)?,
            ch_bias: keys::CH_BIAS.parse(meta)?,
            chmode: keys::CHMODE.parse(meta)?,
            rotation: keys::ROTATION.parse(meta)?,
            ddelta_x: keys::DDELTA_X.parse(meta)?,
            delta_x_dac: keys::DELTA_X_DAC.parse(meta)?,
            channels_code: keys::CHANNELS_CODE.raw(meta)?.1.trim().to_string(),
            scan_ymode: keys::SCAN_YMODE.parse(meta)?,
            x_piezo_const: keys::X_PIEZO.parse(meta)?,
            y_piezo_const: keys::Y_PIEZO.parse(meta)?,
            z_piezo_const: keys::Z_PIEZO.parse(meta)?,
            bias: keys::BIAS.parse(meta)?,
            current: keys::CURRENT.parse(meta)?,
        };

        log::debug!(
            "Extracted fields: {}x{} px, {} channels, version {}",
            fields.x_pixel,
            fields.y_pixel,
            fields.channels,
            fields.file_version
        );
        Ok(fields)
    }
}
