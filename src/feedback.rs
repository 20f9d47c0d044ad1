// SPDX-License-Identifier: GPL-3.0-only

//! Success feedback
//!
//! A short audible cue on successful decode. Strictly fire-and-forget: no
//! sound stack, missing binaries or a muted device must never surface as an
//! error or slow down the scan flow.

use std::process::{Command, Stdio};
use tracing::debug;

/// Invoked once per successful decode
pub trait SuccessFeedback: Send + Sync {
    fn scan_succeeded(&self);
}

/// Plays the desktop "complete" event sound, falling back to the terminal bell
pub struct Beeper;

impl SuccessFeedback for Beeper {
    fn scan_succeeded(&self) {
        tokio::task::spawn_blocking(|| {
            let played = Command::new("canberra-gtk-play")
                .args(["-i", "complete"])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);

            if !played {
                debug!("canberra-gtk-play unavailable, using terminal bell");
                use std::io::Write;
                let _ = std::io::stdout().write_all(b"\x07");
                let _ = std::io::stdout().flush();
            }
        });
    }
}
