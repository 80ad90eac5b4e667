mod common;

use common::*;
use createc::io::read_many_vert;
use createc::{CreatecError, FileVersion, FormatConstants, SpectrumFile};

const FILE_NAME: &str = "A200622.101530.VERT";

const ROWS: &str = "0\t-100.0\t1.5\t2E-10\t0.1\r\n\
                    1\t-50.0\t1.5\t3E-10\t0.2\r\n\
                    2\t0.0\t1.5\t4E-10\t0.3\r\n";

fn payload(header_line: &str, rows: &str) -> String {
    format!("[ParVERT32]\r\n{}\r\n{}", header_line, rows)
}

fn decode(header_line: &str, rows: &str) -> Result<SpectrumFile, CreatecError> {
    init_logging();
    let constants = FormatConstants::embedded().unwrap();
    let bytes = vert_bytes(
        &header_text("ParVERT32", 256, 256, 1, &[]),
        &payload(header_line, rows),
    );
    SpectrumFile::from_bytes_with(&bytes, FILE_NAME, &constants)
}

#[test]
fn test_decode_spectrum() {
    let file = decode("    3    12    34    5    0    0", ROWS).expect("Failed to decode spectrum");

    assert_eq!(file.fields().file_version, FileVersion::ParVert32);
    let header = file.spec_header();
    assert_eq!(header.total_points, 3);
    assert_eq!((header.pos_x, header.pos_y), (12, 34));
    assert_eq!(header.channel_code, 5);
    assert_eq!(header.output_variant, "v2");
    assert_eq!(file.columns(), ["idx", "V", "Z", "I", "dI_q"]);

    let table = file.table();
    assert_eq!(table.index_name(), "idx");
    assert_eq!(table.index(), &[0, 1, 2]);
    assert_eq!(table.column("V").unwrap().to_vec(), vec![-100.0, -50.0, 0.0]);
    assert_eq!(table.column("dI_q").unwrap().to_vec(), vec![0.1, 0.2, 0.3]);
    assert_eq!(table.row_by_index(2).unwrap()[2], 4e-10);
    assert_eq!(file.sample_count_mismatch(), None);
}

#[test]
fn test_declared_count_differs_from_rows() {
    let file = decode("    5    12    34    5    0    0", ROWS).unwrap();
    assert_eq!(file.table().nrows(), 3);
    assert_eq!(file.sample_count_mismatch(), Some((5, 3)));
}

#[test]
fn test_seventh_integer_selects_variant() {
    let rows = "0\t1\t2\t3\t4\t5\t6\t7\r\n";
    let file = decode("1 0 0 1 0 0 6", rows).unwrap();
    assert_eq!(file.spec_header().output_variant, "v6");
    assert_eq!(
        file.columns(),
        ["idx", "V", "Z", "X", "Y", "DAC4", "DAC5", "I"]
    );
    assert_eq!(file.table().column("I").unwrap().to_vec(), vec![7.0]);
}

#[test]
fn test_row_width_mismatch() {
    let rows = "0\t-100.0\t1.5\t2E-10\t0.1\r\n1\t-50.0\t1.5\r\n";
    let result = decode("2 12 34 5 0 0", rows);
    assert!(matches!(
        result,
        Err(CreatecError::ColumnCountMismatch { row: 2, expected: 5, found: 3 })
    ));
}

#[test]
fn test_malformed_header_line() {
    let result = decode("no numbers here", ROWS);
    assert!(matches!(result, Err(CreatecError::MalformedSpecHeader(_))));
}

#[test]
fn test_unknown_variant() {
    let result = decode("3 12 34 5 0 0 4", ROWS);
    assert!(matches!(
        result,
        Err(CreatecError::UnsupportedOutputVariant { variant, .. }) if variant == "v4"
    ));
}

#[test]
fn test_image_version_rejected() {
    let constants = FormatConstants::embedded().unwrap();
    let bytes = vert_bytes(
        &header_text("Paramco32", 256, 256, 1, &[]),
        &payload("3 12 34 5 0 0", ROWS),
    );
    let result = SpectrumFile::from_bytes_with(&bytes, FILE_NAME, &constants);
    assert!(matches!(
        result,
        Err(CreatecError::UnsupportedFormatVersion(v)) if v == "Paramco32"
    ));
}

#[test]
fn test_timestamp() {
    let file = decode("3 12 34 5 0 0", ROWS).unwrap();
    assert_eq!(
        file.timestamp().unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
        "2020-06-22 10:15:30"
    );
}

#[test]
fn test_read_many_vert() {
    init_logging();
    let constants = FormatConstants::embedded().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut paths = Vec::new();
    for (n, header_line) in ["3 1 1 5 0 0", "3 2 2 5 0 0"].iter().enumerate() {
        let path = dir.path().join(format!("A200622.10153{}.VERT", n));
        let bytes = vert_bytes(
            &header_text("ParVERT32", 256, 256, 1, &[]),
            &payload(header_line, ROWS),
        );
        std::fs::write(&path, bytes).unwrap();
        paths.push(path);
    }
    paths.push(dir.path().join("missing.VERT"));

    let results = read_many_vert(&paths, &constants);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().spec_header().pos_x, 1);
    assert_eq!(results[1].as_ref().unwrap().spec_header().pos_x, 2);
    assert_eq!(results[1].as_ref().unwrap().file_name(), "A200622.101531.VERT");
    assert!(matches!(results[2], Err(CreatecError::Io(_))));
}
