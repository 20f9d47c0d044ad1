// SPDX-License-Identifier: GPL-3.0-only

//! Frame luminance extraction
//!
//! Both decoder backends work on 8-bit grayscale. This module converts the
//! supported pixel formats to a tightly packed luma buffer, removing any row
//! stride padding, and can downscale large frames before decoding.

use crate::backends::camera::types::{CameraFrame, PixelFormat};

/// Extract a packed `width * height` luma buffer from a frame
pub fn to_luma(frame: &CameraFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let data = frame.data_slice();

    let mut luma = Vec::with_capacity(width * height);

    for y in 0..height {
        let row = y * stride;
        for x in 0..width {
            luma.push(pixel_luma(frame.format, data, row, x));
        }
    }

    luma
}

fn pixel_luma(format: PixelFormat, data: &[u8], row: usize, x: usize) -> u8 {
    match format {
        PixelFormat::Gray8 => data.get(row + x).copied().unwrap_or(0),
        PixelFormat::Rgb24 => {
            let idx = row + x * 3;
            match data.get(idx..idx + 3) {
                Some(px) => rgb_luma(px[0], px[1], px[2]),
                None => 0,
            }
        }
        PixelFormat::Rgba => {
            let idx = row + x * 4;
            match data.get(idx..idx + 3) {
                Some(px) => rgb_luma(px[0], px[1], px[2]),
                None => 0,
            }
        }
        PixelFormat::Yuyv => {
            // Packed 4:2:2: Y0 U Y1 V, luma at every even byte
            let pair = x & !1;
            let idx = row + pair * 2 + if x & 1 == 0 { 0 } else { 2 };
            data.get(idx).copied().unwrap_or(0)
        }
    }
}

/// BT.601 luma from RGB
fn rgb_luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).clamp(0.0, 255.0) as u8
}

/// Downscale a packed luma buffer with bilinear interpolation
pub fn downscale_luma(
    luma: &[u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Vec<u8> {
    let src_width = src_width as usize;
    let src_height = src_height as usize;

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let get = |px: usize, py: usize| -> f32 {
        luma.get(py * src_width + px).copied().unwrap_or(0) as f32
    };

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let value = get(x0, y0) * (1.0 - x_frac) * (1.0 - y_frac)
                + get(x1, y0) * x_frac * (1.0 - y_frac)
                + get(x0, y1) * (1.0 - x_frac) * y_frac
                + get(x1, y1) * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    result
}

/// Luma for a frame, downscaled so neither dimension exceeds `max_dimension`.
/// Returns the buffer and its dimensions.
pub fn luma_for_decoding(frame: &CameraFrame, max_dimension: u32) -> (Vec<u8>, u32, u32) {
    let luma = to_luma(frame);

    if frame.width <= max_dimension && frame.height <= max_dimension {
        return (luma, frame.width, frame.height);
    }

    let scale = (frame.width as f32 / max_dimension as f32)
        .max(frame.height as f32 / max_dimension as f32);
    let new_width = ((frame.width as f32 / scale) as u32).max(1);
    let new_height = ((frame.height as f32 / scale) as u32).max(1);

    let scaled = downscale_luma(&luma, frame.width, frame.height, new_width, new_height);
    (scaled, new_width, new_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(width: u32, height: u32, stride: u32, format: PixelFormat, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            stride,
            format,
            data: Arc::from(data.as_slice()),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_to_luma_strips_stride_padding() {
        // 2x2 grayscale with 2 bytes of padding per row
        let data = vec![
            10, 20, 0, 0, //
            30, 40, 0, 0,
        ];
        let f = frame(2, 2, 4, PixelFormat::Gray8, data);

        assert_eq!(to_luma(&f), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_to_luma_yuyv_picks_luma_bytes() {
        // One row, 4 pixels: Y0 U Y1 V Y2 U Y3 V
        let data = vec![50, 128, 60, 128, 70, 128, 80, 128];
        let f = frame(4, 1, 8, PixelFormat::Yuyv, data);

        assert_eq!(to_luma(&f), vec![50, 60, 70, 80]);
    }

    #[test]
    fn test_to_luma_rgb_weights_channels() {
        // Pure white and pure black pixels
        let data = vec![255, 255, 255, 0, 0, 0];
        let f = frame(2, 1, 6, PixelFormat::Rgb24, data);

        let luma = to_luma(&f);
        assert!(luma[0] >= 254);
        assert_eq!(luma[1], 0);
    }

    #[test]
    fn test_downscale_luma_gradient() {
        // 4x2 horizontal gradient
        let luma = vec![
            0, 85, 170, 255, //
            0, 85, 170, 255,
        ];

        let result = downscale_luma(&luma, 4, 2, 2, 1);
        assert_eq!(result.len(), 2);
        assert!(result[0] < 100); // near start of gradient
        assert!(result[1] > 150); // near end of gradient
    }

    #[test]
    fn test_luma_for_decoding_caps_dimensions() {
        let f = frame(8, 4, 8, PixelFormat::Gray8, vec![128; 32]);

        let (luma, w, h) = luma_for_decoding(&f, 4);
        assert_eq!(w, 4);
        assert_eq!(h, 2);
        assert_eq!(luma.len(), 8);
    }
}
