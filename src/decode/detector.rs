// SPDX-License-Identifier: GPL-3.0-only

//! Detection-pipeline QR decoder (bardecoder)
//!
//! bardecoder runs a staged pipeline (prepare, detect, extract, decode) over
//! the whole image and reports every code it finds. Only the first
//! successfully decoded symbol is surfaced; this adapter handles QR only.

use crate::backends::camera::CameraFrame;
use crate::constants::DECODE_MAX_DIMENSION;
use crate::decode::luma::luma_for_decoding;
use crate::decode::{Decoded, Decoder};

use tracing::{debug, trace};

pub struct DetectorDecoder {
    /// Frames larger than this are downscaled before the pipeline runs
    max_dimension: u32,
}

impl Default for DetectorDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorDecoder {
    pub fn new() -> Self {
        Self {
            max_dimension: DECODE_MAX_DIMENSION,
        }
    }
}

impl Decoder for DetectorDecoder {
    fn name(&self) -> &'static str {
        "bardecoder"
    }

    fn decode(&self, frame: &CameraFrame) -> Option<Decoded> {
        let (luma, width, height) = luma_for_decoding(frame, self.max_dimension);

        // bardecoder is pinned to image 0.24, hence the aliased crate
        let gray: image024::GrayImage = image024::ImageBuffer::from_raw(width, height, luma)?;
        let img = image024::DynamicImage::ImageLuma8(gray);

        let decoder = bardecoder::default_decoder();
        let results = decoder.decode(&img);

        for result in results {
            match result {
                Ok(content) => {
                    return Some(Decoded {
                        text: content,
                        format: "QR_CODE",
                    });
                }
                Err(e) => {
                    debug!(error = %e, "Detected QR code failed to decode");
                }
            }
        }

        trace!("No QR code in frame");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::PixelFormat;

    #[test]
    fn test_blank_frame_is_no_result() {
        let frame = CameraFrame::new(320, 240, PixelFormat::Gray8, vec![255; 320 * 240]);
        assert!(DetectorDecoder::new().decode(&frame).is_none());
    }

    #[test]
    fn test_noise_frame_is_no_result() {
        // Deterministic pseudo-noise; must not panic and must not match
        let mut state: u32 = 0x2545_F491;
        let data: Vec<u8> = (0..320 * 240)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect();
        let frame = CameraFrame::new(320, 240, PixelFormat::Gray8, data);

        assert!(DetectorDecoder::new().decode(&frame).is_none());
    }
}
