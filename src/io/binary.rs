use crate::constants::FormatConstants;
use crate::types::{CreatecError, CreatecResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Splits a Createc file into its fixed-length header and its payload
pub struct BinaryReader;

impl BinaryReader {
    /// Split an in-memory buffer into `(header, payload)`.
    ///
    /// The header is the first `header_len` bytes; the payload starts at
    /// `payload_offset` (empty when the buffer ends before it).
    pub fn split<'a>(
        buffer: &'a [u8],
        constants: &FormatConstants,
    ) -> CreatecResult<(&'a [u8], &'a [u8])> {
        let header_len = constants.header_len;
        if buffer.len() < header_len {
            return Err(CreatecError::TruncatedInput {
                expected: header_len,
                actual: buffer.len(),
            });
        }

        let payload_start = constants.payload_offset.min(buffer.len());
        Ok((&buffer[..header_len], &buffer[payload_start..]))
    }

    /// Read header and payload from a file without loading the gap between them
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        constants: &FormatConstants,
    ) -> CreatecResult<(Vec<u8>, Vec<u8>)> {
        let path = path.as_ref();
        log::debug!("Reading {} (header {} bytes)", path.display(), constants.header_len);

        let mut file = File::open(path)?;

        let mut header = Vec::with_capacity(constants.header_len);
        (&mut file)
            .take(constants.header_len as u64)
            .read_to_end(&mut header)?;
        if header.len() < constants.header_len {
            return Err(CreatecError::TruncatedInput {
                expected: constants.header_len,
                actual: header.len(),
            });
        }

        file.seek(SeekFrom::Start(constants.payload_offset as u64))?;
        let mut payload = Vec::new();
        file.read_to_end(&mut payload)?;

        log::debug!("Payload: {} bytes", payload.len());
        Ok((header, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small_constants() -> FormatConstants {
        let mut constants = FormatConstants::embedded().unwrap();
        constants.header_len = 8;
        constants.payload_offset = 10;
        constants
    }

    #[test]
    fn test_split_buffer() {
        let constants = small_constants();
        let buffer: Vec<u8> = (0..16).collect();
        let (header, payload) = BinaryReader::split(&buffer, &constants).unwrap();
        assert_eq!(header, &buffer[..8]);
        assert_eq!(payload, &buffer[10..]);
    }

    #[test]
    fn test_split_truncated() {
        let constants = small_constants();
        let result = BinaryReader::split(&[1, 2, 3], &constants);
        assert!(matches!(
            result,
            Err(CreatecError::TruncatedInput { expected: 8, actual: 3 })
        ));
    }

    #[test]
    fn test_split_header_only() {
        let constants = small_constants();
        let buffer = [7u8; 9];
        let (header, payload) = BinaryReader::split(&buffer, &constants).unwrap();
        assert_eq!(header.len(), 8);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_read_file_matches_split() {
        let constants = small_constants();
        let buffer: Vec<u8> = (0..32).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&buffer).unwrap();

        let (header, payload) = BinaryReader::read_file(file.path(), &constants).unwrap();
        let (expected_header, expected_payload) = BinaryReader::split(&buffer, &constants).unwrap();
        assert_eq!(header, expected_header);
        assert_eq!(payload, expected_payload);
    }

    #[test]
    fn test_read_file_truncated() {
        let constants = small_constants();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 5]).unwrap();

        let result = BinaryReader::read_file(file.path(), &constants);
        assert!(matches!(result, Err(CreatecError::TruncatedInput { actual: 5, .. })));
    }
}
