// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use codescan::config::{CameraFacing, Config, ScannerBackend};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(
        config.facing,
        CameraFacing::Back,
        "Back camera should be the default"
    );
    assert_eq!(
        config.backend,
        ScannerBackend::Classic,
        "Classic backend should be the default"
    );
    assert!(config.last_camera_path.is_none());
}

#[test]
fn test_config_json_roundtrip() {
    let config = Config {
        facing: CameraFacing::Front,
        backend: ScannerBackend::Detector,
        last_camera_path: Some("/dev/video2".to_string()),
    };

    let json = serde_json::to_string(&config).expect("serialize");
    let restored: Config = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, config);
}

#[test]
fn test_settings_mirror_config() {
    let config = Config {
        facing: CameraFacing::Front,
        backend: ScannerBackend::Detector,
        last_camera_path: None,
    };

    let settings = config.settings();
    assert_eq!(settings.facing, CameraFacing::Front);
    assert_eq!(settings.backend, ScannerBackend::Detector);
}

#[test]
fn test_toggles_flip_both_ways() {
    assert_eq!(CameraFacing::Back.toggled(), CameraFacing::Front);
    assert_eq!(CameraFacing::Front.toggled(), CameraFacing::Back);
    assert_eq!(ScannerBackend::Classic.toggled(), ScannerBackend::Detector);
    assert_eq!(ScannerBackend::Detector.toggled(), ScannerBackend::Classic);
}
