//! Physical geometry derived from decoded headers
//!
//! Lengths are in Angstrom, as written by the instrument in `Length x[A]`.

use crate::constants::FormatConstants;
use crate::io::fields::{keys, TypedFields};
use crate::io::metadata::MetadataTable;
use crate::types::{CreatecError, CreatecResult, XY2D};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Unit constants the geometry needs, copied out of `FormatConstants`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryUnits {
    /// Volts per XY DAC step
    pub xy_dac_scale: f64,
    pub year_epoch: i32,
}

impl GeometryUnits {
    pub fn from_constants(constants: &FormatConstants) -> Self {
        Self {
            xy_dac_scale: constants.xy_dac_scale(),
            year_epoch: constants.year_epoch,
        }
    }
}

/// Scan-frame offset: `-raw * volt_per_dac * piezo_const / 2^bits` per axis
pub fn offset(
    meta: &MetadataTable,
    fields: &TypedFields,
    units: &GeometryUnits,
) -> CreatecResult<XY2D> {
    let raw_x: f64 = keys::OFFSET_X.parse(meta)?;
    let raw_y: f64 = keys::OFFSET_Y.parse(meta)?;

    Ok(XY2D {
        x: -raw_x * units.xy_dac_scale * fields.x_piezo_const,
        y: -raw_y * units.xy_dac_scale * fields.y_piezo_const,
    })
}

/// Frame size as configured, assuming the scan ran to completion
pub fn nominal_size(meta: &MetadataTable) -> CreatecResult<XY2D> {
    Ok(XY2D {
        x: keys::LENGTH_X.parse(meta)?,
        y: keys::LENGTH_Y.parse(meta)?,
    })
}

/// Frame size actually covered, scaled by post-crop over nominal pixel counts
pub fn size(meta: &MetadataTable, fields: &TypedFields, pixels: XY2D) -> CreatecResult<XY2D> {
    if fields.x_pixel == 0 {
        return Err(CreatecError::MalformedField {
            key: keys::PIXEL_X.primary_key().to_string(),
            value: "0".to_string(),
        });
    }
    if fields.y_pixel == 0 {
        return Err(CreatecError::MalformedField {
            key: keys::PIXEL_Y.primary_key().to_string(),
            value: "0".to_string(),
        });
    }

    let nominal = nominal_size(meta)?;
    Ok(XY2D {
        x: nominal.x * pixels.x / fields.x_pixel as f64,
        y: nominal.y * pixels.y / fields.y_pixel as f64,
    })
}

/// Acquisition time encoded in a file name such as `A200622.081914.dat`.
///
/// All digits are joined and cut into 2-digit tokens read as
/// year, month, day, hour, minute, second; extra digits are ignored.
pub fn file_datetime(file_name: &str, year_epoch: i32) -> CreatecResult<NaiveDateTime> {
    let digits: Vec<u32> = file_name
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    let tokens: Vec<u32> = digits
        .chunks_exact(2)
        .take(6)
        .map(|pair| pair[0] * 10 + pair[1])
        .collect();

    if tokens.len() < 6 {
        return Err(CreatecError::InvalidFileName(file_name.to_string()));
    }

    NaiveDate::from_ymd_opt(year_epoch + tokens[0] as i32, tokens[1], tokens[2])
        .and_then(|date| date.and_hms_opt(tokens[3], tokens[4], tokens[5]))
        .ok_or_else(|| CreatecError::InvalidFileName(file_name.to_string()))
}

/// Rotate `target` about `origin` by `radians` (counter-clockwise)
pub fn rotate_point(target: XY2D, origin: XY2D, radians: f64) -> XY2D {
    let (sin, cos) = radians.sin_cos();
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    XY2D {
        x: origin.x + cos * dx - sin * dy,
        y: origin.y + sin * dx + cos * dy,
    }
}

/// Top-left corner of the scan frame in map coordinates (y pointing up).
///
/// With `scan_ymode == 2` the frame grows from the bottom, so an early
/// stop shifts the top edge by the missing height.
pub fn map_anchor(
    offset: XY2D,
    size: XY2D,
    nominal: XY2D,
    scan_ymode: i64,
    rotation_deg: f64,
) -> XY2D {
    let shortfall = if scan_ymode == 2 {
        nominal.y - size.y
    } else {
        0.0
    };
    let anchor = XY2D {
        x: offset.x - nominal.x / 2.0,
        y: -(offset.y + shortfall),
    };
    rotate_point(
        anchor,
        XY2D::new(offset.x, -offset.y),
        rotation_deg.to_radians(),
    )
}
