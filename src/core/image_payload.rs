use crate::constants::PixelEncoding;
use crate::types::{CreatecError, CreatecResult, Pixel, PixelImage};
use flate2::read::ZlibDecoder;
use ndarray::{s, Array2, Axis};
use std::io::Read;

/// Decodes the zlib-compressed pixel block of a .dat file
pub struct ImagePayloadDecoder {
    width: usize,
    height: usize,
    channels: usize,
    encoding: PixelEncoding,
}

impl ImagePayloadDecoder {
    pub fn new(width: usize, height: usize, channels: usize, encoding: PixelEncoding) -> Self {
        Self {
            width,
            height,
            channels,
            encoding,
        }
    }

    /// Samples needed after the leading sentinel
    pub fn expected_samples(&self) -> usize {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(self.channels)
    }

    /// Decode one `height x width` array per channel, uncropped
    pub fn decode_raw(&self, payload: &[u8]) -> CreatecResult<Vec<PixelImage>> {
        let inflated = inflate(payload)?;
        let samples = to_samples(&inflated, self.encoding);
        log::debug!(
            "Inflated {} bytes into {} samples ({} expected)",
            inflated.len(),
            samples.len(),
            self.expected_samples() + 1
        );
        self.split_channels(&samples)
    }

    /// Decode and crop every channel
    pub fn decode(&self, payload: &[u8]) -> CreatecResult<Vec<PixelImage>> {
        let raw = self.decode_raw(payload)?;
        Ok(raw.iter().map(crop_zero_rows).collect())
    }

    /// Drop the sentinel, reshape to `(channels * height, width)` and slice per channel
    pub fn split_channels(&self, samples: &[Pixel]) -> CreatecResult<Vec<PixelImage>> {
        let expected = self.expected_samples();
        let available = samples.len().saturating_sub(1);
        if available < expected {
            return Err(CreatecError::ShortPayload {
                expected,
                actual: available,
            });
        }

        let body: Vec<Pixel> = samples.iter().skip(1).take(expected).copied().collect();
        let rows = self.channels.saturating_mul(self.height);
        let stacked = Array2::from_shape_vec((rows, self.width), body)
            .map_err(|_| CreatecError::ShortPayload {
                expected,
                actual: available,
            })?;

        let images = (0..self.channels)
            .map(|ch| {
                stacked
                    .slice(s![ch * self.height..(ch + 1) * self.height, ..])
                    .to_owned()
            })
            .collect();
        Ok(images)
    }
}

/// Inflate a zlib stream
pub fn inflate(payload: &[u8]) -> CreatecResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| CreatecError::Decompression(format!("zlib: {}", e)))?;
    Ok(inflated)
}

/// Reinterpret bytes as 16-bit samples; a dangling odd byte is ignored
pub fn to_samples(bytes: &[u8], encoding: PixelEncoding) -> Vec<Pixel> {
    if bytes.len() % 2 != 0 {
        log::warn!(
            "Pixel data has an odd length of {} bytes, ignoring the last byte",
            bytes.len()
        );
    }
    bytes
        .chunks_exact(2)
        .map(|pair| encoding.decode([pair[0], pair[1]]))
        .collect()
}

/// Remove every all-zero row, keeping the order of the rest.
///
/// Zero rows mark lines the scan never reached, so the result may have
/// fewer rows than the nominal height.
pub fn crop_zero_rows(image: &PixelImage) -> PixelImage {
    let keep: Vec<usize> = image
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().any(|&v| v != 0))
        .map(|(i, _)| i)
        .collect();

    if keep.len() < image.nrows() {
        log::debug!("Cropped {} empty rows", image.nrows() - keep.len());
    }
    Array2::from_shape_fn((keep.len(), image.ncols()), |(r, c)| image[[keep[r], c]])
}
