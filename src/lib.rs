// SPDX-License-Identifier: GPL-3.0-only

//! codescan - a barcode and QR code scanner for the terminal
//!
//! This library provides the core functionality for the codescan
//! application: camera capture, barcode decoding and scan orchestration.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`scan`]: Scan state machine and result types
//! - [`decode`]: Decoder adapters over the two decoding libraries
//! - [`backends`]: Camera capture abstraction (V4L2)
//! - [`terminal`]: Interactive terminal UI
//! - [`config`]: User configuration handling
//! - [`feedback`]: Audible success feedback

pub mod backends;
pub mod config;
pub mod constants;
pub mod decode;
pub mod errors;
pub mod feedback;
pub mod scan;
pub mod terminal;

// Re-export commonly used types
pub use config::{CameraFacing, Config, ScannerBackend, ScannerSettings};
pub use decode::{Decoded, Decoder};
pub use scan::{ScanAction, ScanEngine, ScanResult, ScanState};
