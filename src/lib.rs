//! createc: decoder for Createc STM data files
//!
//! Reads the two file kinds written by the Createc STM control software:
//! `.dat` image scans (metadata plus one zlib-compressed raster per channel)
//! and `.vert` point spectroscopy (metadata plus a delimited sample table).
//! Decoding is pure and synchronous; files can be decoded concurrently.

pub mod types;
pub mod constants;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    CreatecError, CreatecResult, FileVersion, Pixel, PixelImage, XY2D
};

pub use constants::{FormatConstants, PixelEncoding};
pub use io::{ImageFile, SpectrumFile, MetadataTable, TypedFields};
pub use crate::core::{SpecHeader, SpecTable};
