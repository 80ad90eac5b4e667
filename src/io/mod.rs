//! I/O modules for reading Createc image and spectroscopy files

pub mod binary;
pub mod metadata;
pub mod fields;
pub mod dat_reader;
pub mod vert_reader;

pub use binary::BinaryReader;
pub use metadata::MetadataTable;
pub use fields::{FieldExtractor, TypedFields};
pub use dat_reader::ImageFile;
pub use vert_reader::SpectrumFile;

use crate::constants::FormatConstants;
use crate::types::CreatecResult;
use std::path::PathBuf;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Decode many .dat files; each result is independent of the others
pub fn read_many_dat(
    paths: &[PathBuf],
    constants: &FormatConstants,
) -> Vec<CreatecResult<ImageFile>> {
    log::info!("Decoding {} image files", paths.len());

    #[cfg(feature = "parallel")]
    let results = paths
        .par_iter()
        .map(|path| ImageFile::open_with(path, constants))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = paths
        .iter()
        .map(|path| ImageFile::open_with(path, constants))
        .collect();

    results
}

/// Decode many .vert files; each result is independent of the others
pub fn read_many_vert(
    paths: &[PathBuf],
    constants: &FormatConstants,
) -> Vec<CreatecResult<SpectrumFile>> {
    log::info!("Decoding {} spectroscopy files", paths.len());

    #[cfg(feature = "parallel")]
    let results = paths
        .par_iter()
        .map(|path| SpectrumFile::open_with(path, constants))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = paths
        .iter()
        .map(|path| SpectrumFile::open_with(path, constants))
        .collect();

    results
}
