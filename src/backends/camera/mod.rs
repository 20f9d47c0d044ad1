// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend (V4L2)

pub mod types;
pub mod v4l2;

pub use types::{CameraDevice, CameraFrame, PixelFormat};
pub use v4l2::{CameraStream, enumerate_cameras, select_device};
