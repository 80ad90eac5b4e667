use crate::constants::FormatConstants;
use crate::core::geometry;
use crate::core::spec_header::SpecHeader;
use crate::core::spec_table::{split_payload, SpecTable};
use crate::io::binary::BinaryReader;
use crate::io::fields::{FieldExtractor, TypedFields};
use crate::io::metadata::MetadataTable;
use crate::types::CreatecResult;
use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1252;
use std::path::Path;

/// A decoded Createc .vert spectroscopy file
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFile {
    file_name: String,
    meta: MetadataTable,
    fields: TypedFields,
    header: SpecHeader,
    table: SpecTable,
    year_epoch: i32,
}

impl SpectrumFile {
    /// Read and decode a .vert file using the process-wide constants
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

    /// Decode a complete file held in memory
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
        log::info!("Decoding spectroscopy file {}", file_name);

        let meta = MetadataTable::decode(header);
        let version = meta.version()?;
        constants.ensure_spec_version(version)?;

        let fields = FieldExtractor::extract(&meta)?;

        let (text, _) = WINDOWS_1252.decode_without_bom_handling(payload);
        let (header_line, body) = split_payload(&text)?;
        let spec_header = SpecHeader::decode(header_line, version, constants)?;
        let table = SpecTable::parse(body, &spec_header.columns, constants.spec_delimiter_byte())?;

        if table.nrows() != spec_header.total_points {
            log::warn!(
                "{}: header declares {} points but the table has {} rows",
                file_name,
                spec_header.total_points,
                table.nrows()
            );
        }
        log::info!(
            "Decoded {}: version {}, {} rows x {} columns",
            file_name,
            version,
            table.nrows(),
            spec_header.columns.len()
        );

        Ok(Self {
            file_name: file_name.to_string(),
            meta,
            fields,
            header: spec_header,
            table,
            year_epoch: constants.year_epoch,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn meta(&self) -> &MetadataTable {
        &self.meta
    }

    pub fn fields(&self) -> &TypedFields {
        &self.fields
    }

    /// Scan-point header: sample count, probe position, channel code, variant
    pub fn spec_header(&self) -> &SpecHeader {
        &self.header
    }

    /// Full column list, index column first
    pub fn columns(&self) -> &[String] {
        &self.header.columns
    }

    pub fn table(&self) -> &SpecTable {
        &self.table
    }

    /// `(declared, actual)` when the row count differs from the header
    pub fn sample_count_mismatch(&self) -> Option<(usize, usize)> {
        let declared = self.header.total_points;
        let actual = self.table.nrows();
        (declared != actual).then_some((declared, actual))
    }

    pub fn timestamp(&self) -> CreatecResult<NaiveDateTime> {
        geometry::file_datetime(&self.file_name, self.year_epoch)
    }
}
