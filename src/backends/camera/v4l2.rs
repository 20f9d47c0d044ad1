// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 capture backend
//!
//! Frames are read on a dedicated thread and pushed into a small bounded
//! channel. The channel is lossy on purpose: when the consumer falls behind,
//! new frames are dropped because only the most recent one is worth decoding.

use crate::backends::camera::types::{CameraDevice, CameraFrame, PixelFormat};
use crate::config::CameraFacing;
use crate::constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH, FRAME_CHANNEL_CAPACITY};
use crate::errors::CameraError;

use futures::channel::mpsc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;

/// Enumerate capture-capable V4L2 devices
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let mut devices = Vec::new();

    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let dev = match v4l::Device::with_path(node.path()) {
            Ok(dev) => dev,
            Err(e) => {
                trace!(path = %path, error = %e, "Skipping unopenable video node");
                continue;
            }
        };

        let caps = match dev.query_caps() {
            Ok(caps) => caps,
            Err(e) => {
                trace!(path = %path, error = %e, "Failed to query capabilities");
                continue;
            }
        };

        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            continue;
        }

        // Metadata-only nodes advertise capture but expose no pixel formats
        let has_formats = dev
            .enum_formats()
            .map(|formats| !formats.is_empty())
            .unwrap_or(false);
        if !has_formats {
            continue;
        }

        let name = node.name().unwrap_or_else(|| caps.card.clone());
        devices.push(CameraDevice {
            location: guess_location(&name),
            name,
            path,
            driver: caps.driver.clone(),
        });
    }

    debug!(count = devices.len(), "Enumerated cameras");
    devices
}

/// Derive a location hint from the device name
///
/// V4L2 has no front/back notion on desktops; laptop and phone vendors
/// usually encode it in the card name instead.
fn guess_location(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    if lower.contains("front") || lower.contains("integrated") || lower.contains("user") {
        Some("front".to_string())
    } else if lower.contains("back") || lower.contains("rear") || lower.contains("world") {
        Some("back".to_string())
    } else {
        None
    }
}

/// Pick the device best matching the requested facing
///
/// Falls back to device order when no location hints are available: the
/// first node is treated as the back camera, the second as the front.
pub fn select_device(devices: &[CameraDevice], facing: CameraFacing) -> Option<&CameraDevice> {
    if devices.is_empty() {
        return None;
    }

    let wanted = match facing {
        CameraFacing::Front => "front",
        CameraFacing::Back => "back",
    };

    if let Some(dev) = devices
        .iter()
        .find(|d| d.location.as_deref() == Some(wanted))
    {
        return Some(dev);
    }

    match facing {
        CameraFacing::Back => devices.first(),
        CameraFacing::Front => devices.get(1).or_else(|| devices.first()),
    }
}

/// A running camera capture stream
pub struct CameraStream {
    receiver: mpsc::Receiver<CameraFrame>,
    stop: Arc<AtomicBool>,
    pub device_path: String,
}

impl CameraStream {
    /// Open the device and start the capture thread
    pub fn open(device: &CameraDevice) -> Result<Self, CameraError> {
        let dev = v4l::Device::with_path(&device.path)
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        let mut fmt = dev
            .format()
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;
        fmt.width = CAPTURE_WIDTH;
        fmt.height = CAPTURE_HEIGHT;
        fmt.fourcc = FourCC::new(b"YUYV");

        let fmt = dev
            .set_format(&fmt)
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        if fmt.fourcc != FourCC::new(b"YUYV") {
            return Err(CameraError::InvalidFormat(format!(
                "Device would not accept YUYV (got {})",
                fmt.fourcc
            )));
        }

        info!(
            device = %device.name,
            width = fmt.width,
            height = fmt.height,
            "Camera capture started"
        );

        let (sender, receiver) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let width = fmt.width;
        let height = fmt.height;
        std::thread::Builder::new()
            .name("camera-capture".into())
            .spawn(move || capture_loop(dev, width, height, sender, thread_stop))
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            receiver,
            stop,
            device_path: device.path.clone(),
        })
    }

    /// Non-blocking receive of the next frame, if one is buffered
    pub fn try_next_frame(&mut self) -> Option<CameraFrame> {
        self.receiver.try_next().ok().flatten()
    }

    /// Drain buffered frames and return only the most recent one
    pub fn latest_frame(&mut self) -> Option<CameraFrame> {
        let mut latest = None;
        while let Some(frame) = self.try_next_frame() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn capture_loop(
    dev: v4l::Device,
    width: u32,
    height: u32,
    mut sender: mpsc::Sender<CameraFrame>,
    stop: Arc<AtomicBool>,
) {
    let mut stream = match MmapStream::with_buffers(&dev, Type::VideoCapture, 4) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Failed to start capture stream");
            return;
        }
    };

    let stride = width * 2; // packed YUYV

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let (buf, _meta) = match stream.next() {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "Capture stream ended");
                break;
            }
        };

        // next() blocks until the device delivers, so a stop raised meanwhile
        // is only observed here; the stale frame is not forwarded
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let frame = CameraFrame {
            width,
            height,
            stride,
            format: PixelFormat::Yuyv,
            data: Arc::from(buf),
            captured_at: Instant::now(),
        };

        if sender.try_send(frame).is_err() {
            trace!("Frame buffer full, dropping frame");
        }
    }

    debug!("Capture thread exiting");
}
