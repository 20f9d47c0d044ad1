// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera capture

use std::sync::Arc;
use std::time::Instant;

/// Pixel format for camera frames
///
/// YUYV is what webcams typically deliver; the other formats cover image
/// files fed through the one-shot decode path and synthetic test frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale, single channel
    Gray8,
    /// 24-bit RGB, 3 bytes per pixel
    Rgb24,
    /// 32-bit RGBA, 4 bytes per pixel
    Rgba,
    /// Packed 4:2:2 YUV (Y0 U Y1 V, 4 bytes per 2 pixels)
    Yuyv,
}

impl PixelFormat {
    /// Bytes per pixel for stride calculations
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb24 => 3,
            PixelFormat::Rgba => 4,
            PixelFormat::Yuyv => 2,
        }
    }
}

/// A single frame from the camera
///
/// Pixel data is reference counted so frames can be handed to a decode task
/// without copying.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Pixel format of the data
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame with a tightly packed stride
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
            data: Arc::from(data.as_slice()),
            captured_at: Instant::now(),
        }
    }

    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    /// Path to the capture device (e.g., /dev/video0)
    pub path: String,
    /// V4L2 driver name
    pub driver: String,
    /// Location hint ("front", "back", "external") when the device exposes one
    pub location: Option<String>,
}
