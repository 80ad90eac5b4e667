#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub const HEADER_LEN: usize = 16384;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Header text with every required field; `extra` lines are appended verbatim
pub fn header_text(version: &str, x: usize, y: usize, channels: usize, extra: &[&str]) -> String {
    let mut lines = vec![
        format!("[{}]", version),
        format!("Num.X / Num.X={}", x),
        format!("Num.Y / Num.Y={}", y),
        format!("Channels / Channels={}", channels),
        "CHModeZoff / CHModeZoff=0.5".to_string(),
        "CHModeBias[mV] / CHModeBias[mV]=300".to_string(),
        "CHMode / CHMode=0".to_string(),
        "Rotation / Rotation=90".to_string(),
        "DX_DIV_DDelta-X / DX_DIV_DDelta-X=16".to_string(),
        "Delta X / Delta X [Dac]=128".to_string(),
        "ChannelSelectVal / ChannelSelectVal=5".to_string(),
        "ScanYMode / ScanYMode=0".to_string(),
        "Xpiezoconst=20".to_string(),
        "YPiezoconst=20".to_string(),
        "ZPiezoconst=2.5".to_string(),
        "BiasVoltage / BiasVolt.[mV]=-500".to_string(),
        "FBLogIset=100.0".to_string(),
        "Scanrotoffx / OffsetX=6553.6".to_string(),
        "Scanrotoffy / OffsetY=0".to_string(),
        "Length x[A]=200".to_string(),
        "Length y[A]=300".to_string(),
    ];
    lines.extend(extra.iter().map(|s| s.to_string()));
    let mut text = lines.join("\r\n");
    text.push_str("\r\n");
    text
}

/// Header block padded with NULs to the fixed header length
pub fn header_block(text: &str) -> Vec<u8> {
    let mut block = text.as_bytes().to_vec();
    assert!(block.len() <= HEADER_LEN);
    block.resize(HEADER_LEN, 0);
    block
}

pub fn compress_samples(samples: &[u16]) -> Vec<u8> {
    let bytes: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes).unwrap();
    encoder.finish().unwrap()
}

/// A complete .dat file: header block followed by the compressed samples
pub fn dat_bytes(header: &str, samples: &[u16]) -> Vec<u8> {
    let mut bytes = header_block(header);
    bytes.extend(compress_samples(samples));
    bytes
}

/// A complete .vert file: header block followed by the text payload
pub fn vert_bytes(header: &str, payload: &str) -> Vec<u8> {
    let mut bytes = header_block(header);
    bytes.extend_from_slice(payload.as_bytes());
    bytes
}
