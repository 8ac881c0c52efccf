// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use facecapture::Config;
use facecapture::backends::camera::CameraBackendType;
use facecapture::pipelines::photo::{EncodingFormat, EncodingQuality};

#[test]
fn test_config_default() {
    // Test that default config can be created
    let config = Config::default();

    // Check sensible defaults
    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(config.backend, CameraBackendType::Virtual);
    assert_eq!(config.photo_quality, EncodingQuality::High);
    assert_eq!(config.photo_format, EncodingFormat::Jpeg);
}

#[test]
fn test_config_round_trips_through_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("facecapture").join("config.json");

    let mut config = Config::default();
    config.photo_quality = EncodingQuality::Maximum;
    config.photo_format = EncodingFormat::Png;
    config.overlay.timings.fade_in_ms = 450;
    config.save_to(&path).expect("save config");

    let loaded = Config::load_from(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = Config::load_from(&dir.path().join("absent.json"));
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_photo_dir_prefers_configured_directory() {
    let mut config = Config::default();
    config.photo_directory = Some("/tmp/checkins".into());
    assert_eq!(config.photo_dir(), std::path::PathBuf::from("/tmp/checkins"));
}
