// SPDX-License-Identifier: GPL-3.0-only

//! Classical multi-format decoder (rxing)
//!
//! Deterministic pixel-pattern decoding across all symbologies rxing knows:
//! 2D matrix codes (QR, Data Matrix, Aztec, PDF417) and the linear formats
//! (CODE_128, EAN, UPC, ...). The try-harder hint trades latency for recall,
//! which is the right trade for camera frames of uneven quality.

use crate::backends::camera::CameraFrame;
use crate::constants::DECODE_MAX_DIMENSION;
use crate::decode::luma::luma_for_decoding;
use crate::decode::{Decoded, Decoder};

use rxing::common::HybridBinarizer;
use rxing::{
    BarcodeFormat, BinaryBitmap, DecodeHintType, DecodeHintValue, DecodingHintDictionary,
    Luma8LuminanceSource, MultiFormatReader, Reader,
};
use tracing::trace;

pub struct ClassicDecoder {
    hints: DecodingHintDictionary,
}

impl Default for ClassicDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassicDecoder {
    pub fn new() -> Self {
        let mut hints = DecodingHintDictionary::new();
        hints.insert(
            DecodeHintType::TRY_HARDER,
            DecodeHintValue::TryHarder(true),
        );
        Self { hints }
    }
}

impl Decoder for ClassicDecoder {
    fn name(&self) -> &'static str {
        "rxing"
    }

    fn decode(&self, frame: &CameraFrame) -> Option<Decoded> {
        let (luma, width, height) = luma_for_decoding(frame, DECODE_MAX_DIMENSION);

        let source = Luma8LuminanceSource::new(luma, width, height);
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
        let mut reader = MultiFormatReader::default();

        match reader.decode_with_hints(&mut bitmap, &self.hints) {
            Ok(result) => Some(Decoded {
                text: result.getText().to_string(),
                format: format_name(result.getBarcodeFormat()),
            }),
            Err(e) => {
                // "Not found" and genuine reader failures are the same
                // outcome for the caller: no result this frame.
                trace!(error = %e, "No barcode in frame");
                None
            }
        }
    }
}

/// Stable format labels, decoupled from the library's Display impl
pub fn format_name(format: &BarcodeFormat) -> &'static str {
    match format {
        BarcodeFormat::AZTEC => "AZTEC",
        BarcodeFormat::CODABAR => "CODABAR",
        BarcodeFormat::CODE_39 => "CODE_39",
        BarcodeFormat::CODE_93 => "CODE_93",
        BarcodeFormat::CODE_128 => "CODE_128",
        BarcodeFormat::DATA_MATRIX => "DATA_MATRIX",
        BarcodeFormat::EAN_8 => "EAN_8",
        BarcodeFormat::EAN_13 => "EAN_13",
        BarcodeFormat::ITF => "ITF",
        BarcodeFormat::MAXICODE => "MAXICODE",
        BarcodeFormat::PDF_417 => "PDF_417",
        BarcodeFormat::QR_CODE => "QR_CODE",
        BarcodeFormat::UPC_A => "UPC_A",
        BarcodeFormat::UPC_E => "UPC_E",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::PixelFormat;

    /// Render a BitMatrix from the rxing writer into a grayscale frame
    fn matrix_frame(contents: &str, format: &BarcodeFormat, width: i32, height: i32) -> CameraFrame {
        use rxing::{MultiFormatWriter, Writer};

        let matrix = MultiFormatWriter
            .encode(contents, format, width, height)
            .expect("encode fixture");

        let w = matrix.getWidth();
        let h = matrix.getHeight();
        let mut data = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                data.push(if matrix.get(x, y) { 0u8 } else { 255u8 });
            }
        }

        CameraFrame::new(w, h, PixelFormat::Gray8, data)
    }

    #[test]
    fn test_decodes_code_128() {
        let frame = matrix_frame("12345", &BarcodeFormat::CODE_128, 400, 120);
        let decoded = ClassicDecoder::new().decode(&frame).expect("should decode");

        assert_eq!(decoded.text, "12345");
        assert_eq!(decoded.format, "CODE_128");
    }

    #[test]
    fn test_decodes_qr() {
        let frame = matrix_frame("https://example.com", &BarcodeFormat::QR_CODE, 400, 400);
        let decoded = ClassicDecoder::new().decode(&frame).expect("should decode");

        assert_eq!(decoded.text, "https://example.com");
        assert_eq!(decoded.format, "QR_CODE");
    }

    #[test]
    fn test_blank_frame_is_no_result() {
        let frame = CameraFrame::new(320, 240, PixelFormat::Gray8, vec![255; 320 * 240]);
        assert!(ClassicDecoder::new().decode(&frame).is_none());
    }
}
