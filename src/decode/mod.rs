// SPDX-License-Identifier: GPL-3.0-only

//! Decoder adapters
//!
//! Each adapter wraps one external decoding library behind the same
//! capability: given a camera frame, produce zero or one decoded result.
//! The absence of a match is a normal outcome, not an error, and backend
//! failures are folded into it; adapters never panic on malformed frames.

pub mod classic;
pub mod detector;
pub mod luma;

use crate::backends::camera::CameraFrame;
use crate::config::ScannerBackend;
use std::sync::Arc;

/// A decoded symbol: the payload plus its symbology label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Format label, e.g. "CODE_128" or "QR_CODE"
    pub format: &'static str,
}

/// Common capability of the two decoding backends
///
/// Implementations are stateless across calls; switching backends rebinds
/// the adapter with no carryover.
pub trait Decoder: Send + Sync {
    /// Library name for logs and the UI
    fn name(&self) -> &'static str;

    /// Attempt to decode a single frame. `None` means no recognizable
    /// symbol, for whatever reason.
    fn decode(&self, frame: &CameraFrame) -> Option<Decoded>;
}

/// Construct the adapter for the selected backend
pub fn make_decoder(backend: ScannerBackend) -> Arc<dyn Decoder> {
    match backend {
        ScannerBackend::Classic => Arc::new(classic::ClassicDecoder::new()),
        ScannerBackend::Detector => Arc::new(detector::DetectorDecoder::new()),
    }
}
