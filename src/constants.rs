// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier (config directory name)
pub const APP_ID: &str = "codescan";

/// How long scanning stays paused after a successful decode
///
/// During this window incoming frames are dropped, so the same code is not
/// reported repeatedly while it is still in front of the camera.
pub const SCAN_COOLDOWN: Duration = Duration::from_millis(3000);

/// Maximum number of results kept in the scan history (oldest evicted)
pub const HISTORY_LIMIT: usize = 32;

/// Maximum dimension for decoding (larger frames are downscaled first)
///
/// Barcodes are typically large enough to be decoded at this resolution,
/// and downscaling keeps per-frame latency low.
pub const DECODE_MAX_DIMENSION: u32 = 640;

/// Default capture resolution requested from the camera
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// Number of frames buffered between the capture thread and the UI.
/// When the buffer is full new frames are dropped; only the latest matters.
pub const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Terminal UI input poll interval (also paces preview redraws)
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);
