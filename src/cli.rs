// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Decoding a barcode from an image file

use codescan::backends::camera::enumerate_cameras;
use codescan::backends::camera::types::{CameraFrame, PixelFormat};
use codescan::config::ScannerBackend;
use codescan::decode::make_decoder;
use codescan::scan::ScanAction;

use std::path::Path;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}  Driver: {}", camera.path, camera.driver);
        if let Some(location) = &camera.location {
            println!("      Location: {}", location);
        }
        println!();
    }

    Ok(())
}

/// Decode a barcode or QR code from an image file
pub fn decode_image(path: &Path, backend: ScannerBackend) -> Result<(), Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    let gray = img.to_luma8();
    let (width, height) = (gray.width(), gray.height());

    let frame = CameraFrame::new(width, height, PixelFormat::Gray8, gray.into_raw());

    let decoder = make_decoder(backend);
    match decoder.decode(&frame) {
        Some(decoded) => {
            let action = ScanAction::parse(&decoded.text);
            println!("Format:  {}", decoded.format);
            println!("Kind:    {}", action.label());
            println!("Content: {}", decoded.text);
            Ok(())
        }
        None => Err(format!("No barcode found in {}", path.display()).into()),
    }
}
