use crate::constants::FormatConstants;
use crate::core::geometry::{self, GeometryUnits};
use crate::core::image_payload::{crop_zero_rows, ImagePayloadDecoder};
use crate::core::spec_header::select_channels;
use crate::io::binary::BinaryReader;
use crate::io::fields::{FieldExtractor, TypedFields};
use crate::io::metadata::MetadataTable;
use crate::types::{CreatecResult, PixelImage, XY2D};
use chrono::NaiveDateTime;
use std::path::Path;

/// A decoded Createc .dat image file
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    file_name: String,
    meta: MetadataTable,
    fields: TypedFields,
    raw_images: Vec<PixelImage>,
    images: Vec<PixelImage>,
    channel_list: Vec<String>,
    units: GeometryUnits,
}

impl ImageFile {
    /// Read and decode a .dat file using the process-wide constants
    pub fn open<P: AsRef<Path>>(path: P) -> CreatecResult<Self> {
        Self::open_with(path, FormatConstants::global()?)
    }

    pub fn open_with<P: AsRef<Path>>(path: P, constants: &FormatConstants) -> CreatecResult<Self> {
        let path = path.as_ref();
        let (header, payload) = BinaryReader::read_file(path, constants)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_parts(&header, &payload, &file_name, constants)
    }

    /// Decode a complete file image held in memory, e.g. an upload.
    /// `file_name` is only used for the timestamp.
    pub fn from_bytes(bytes: &[u8], file_name: &str) -> CreatecResult<Self> {
        Self::from_bytes_with(bytes, file_name, FormatConstants::global()?)
    }

    pub fn from_bytes_with(
        bytes: &[u8],
        file_name: &str,
        constants: &FormatConstants,
    ) -> CreatecResult<Self> {
        let (header, payload) = BinaryReader::split(bytes, constants)?;
        Self::from_parts(header, payload, file_name, constants)
    }

    fn from_parts(
        header: &[u8],
        payload: &[u8],
        file_name: &str,
        constants: &FormatConstants,
    ) -> CreatecResult<Self> {
        log::info!("Decoding image file {}", file_name);

        let meta = MetadataTable::decode(header);
        let version = meta.version()?;
        let channel_list = constants.image_channel_names(version)?.to_vec();
        if meta.line_count() > constants.header_total_lines {
            log::warn!(
                "{}: header has {} lines, more than the nominal {}",
                file_name,
                meta.line_count(),
                constants.header_total_lines
            );
        }

        let fields = FieldExtractor::extract(&meta)?;

        let decoder = ImagePayloadDecoder::new(
            fields.x_pixel,
            fields.y_pixel,
            fields.channels,
            constants.pixel_dtype,
        );
        let raw_images = decoder.decode_raw(payload)?;
        let images: Vec<PixelImage> = raw_images.iter().map(crop_zero_rows).collect();

        log::info!(
            "Decoded {}: version {}, {} channels of {}x{} px ({} rows after crop)",
            file_name,
            version,
            images.len(),
            fields.x_pixel,
            fields.y_pixel,
            images.first().map(|img| img.nrows()).unwrap_or(0)
        );

        Ok(Self {
            file_name: file_name.to_string(),
            meta,
            fields,
            raw_images,
            images,
            channel_list,
            units: GeometryUnits::from_constants(constants),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn meta(&self) -> &MetadataTable {
        &self.meta
    }

    /// All metadata keys, sorted
    pub fn meta_keys(&self) -> Vec<&str> {
        self.meta.keys()
    }

    pub fn fields(&self) -> &TypedFields {
        &self.fields
    }

    /// One image per channel with all-zero rows removed
    pub fn images(&self) -> &[PixelImage] {
        &self.images
    }

    /// One full-height image per channel, before cropping
    pub fn raw_images(&self) -> &[PixelImage] {
        &self.raw_images
    }

    /// Post-crop pixel counts of the first channel
    pub fn pixels(&self) -> XY2D {
        self.images
            .first()
            .map(|img| XY2D::new(img.ncols() as f64, img.nrows() as f64))
            .unwrap_or_default()
    }

    /// Names of the recorded channels, selected by the channel-select code
    pub fn channel_names(&self) -> CreatecResult<Vec<String>> {
        let code = self.fields.channel_select_bits()?;
        Ok(select_channels(&self.channel_list, code))
    }

    pub fn offset(&self) -> CreatecResult<XY2D> {
        geometry::offset(&self.meta, &self.fields, &self.units)
    }

    /// Covered frame size, shrunk when the scan stopped early
    pub fn size(&self) -> CreatecResult<XY2D> {
        geometry::size(&self.meta, &self.fields, self.pixels())
    }

    pub fn nominal_size(&self) -> CreatecResult<XY2D> {
        geometry::nominal_size(&self.meta)
    }

    /// Acquisition time from the file name
    pub fn timestamp(&self) -> CreatecResult<NaiveDateTime> {
        geometry::file_datetime(&self.file_name, self.units.year_epoch)
    }

    /// Seconds since 1970-01-01, reading the file-name time as UTC
    pub fn unix_timestamp(&self) -> CreatecResult<i64> {
        Ok(self.timestamp()?.and_utc().timestamp())
    }

    /// Top-left corner of the rotated frame in map coordinates
    pub fn map_anchor(&self) -> CreatecResult<XY2D> {
        Ok(geometry::map_anchor(
            self.offset()?,
            self.size()?,
            self.nominal_size()?,
            self.fields.scan_ymode,
            self.fields.rotation,
        ))
    }
}
