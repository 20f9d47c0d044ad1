// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Settings are persisted as JSON under the user config directory and
//! reloaded on startup. A missing or unreadable file falls back to defaults;
//! configuration problems never prevent the application from starting.

use crate::constants::APP_ID;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Which camera the scanner should use
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CameraFacing {
    /// User-facing camera (selfie side)
    Front,
    /// World-facing camera
    #[default]
    Back,
}

impl CameraFacing {
    pub fn display_name(&self) -> &'static str {
        match self {
            CameraFacing::Front => "Front",
            CameraFacing::Back => "Back",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// Which decoding backend processes camera frames
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ScannerBackend {
    /// Classical multi-format decoder (rxing): 2D matrix plus linear
    /// symbologies, deterministic, tunable via the try-harder hint
    #[default]
    Classic,
    /// Detection-pipeline QR decoder (bardecoder)
    Detector,
}

impl ScannerBackend {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScannerBackend::Classic => "Classic (rxing)",
            ScannerBackend::Detector => "Detector (bardecoder)",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ScannerBackend::Classic => ScannerBackend::Detector,
            ScannerBackend::Detector => ScannerBackend::Classic,
        }
    }
}

/// Scanner settings owned by the scan engine
///
/// Immutable from the UI's point of view: changes go through engine intents
/// and replace the value wholesale.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScannerSettings {
    pub facing: CameraFacing,
    pub backend: ScannerBackend,
}

/// Persisted application configuration
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Preferred camera facing
    pub facing: CameraFacing,
    /// Decoding backend to use
    pub backend: ScannerBackend,
    /// Last used camera device path
    pub last_camera_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing: CameraFacing::default(),
            backend: ScannerBackend::default(),
            last_camera_path: None,
        }
    }
}

impl Config {
    /// Path to the config file ("~/.config/codescan/config.json")
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_ID).join("config.json"))
    }

    /// Load the configuration, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration to disk
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path().ok_or_else(|| AppError::Config("No config directory".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Scanner settings derived from this configuration
    pub fn settings(&self) -> ScannerSettings {
        ScannerSettings {
            facing: self.facing,
            backend: self.backend,
        }
    }
}
