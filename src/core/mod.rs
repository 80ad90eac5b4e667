//! Format-independent decoding steps

pub mod image_payload;
pub mod spec_header;
pub mod spec_table;
pub mod geometry;

// Re-export main types
pub use image_payload::{ImagePayloadDecoder, crop_zero_rows};
pub use spec_header::{SpecHeader, channel_mask, select_channels};
pub use spec_table::SpecTable;
pub use geometry::{GeometryUnits, rotate_point};
