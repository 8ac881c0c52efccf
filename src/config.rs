// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::CameraBackendType;
use crate::constants::overlay;
use crate::errors::{AppError, AppResult};
use crate::overlay::{CutoutLayout, OverlayTimings};
use crate::pipelines::photo::{EncodingFormat, EncodingQuality};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Application directory name under the XDG config dir
const CONFIG_DIR_NAME: &str = "facecapture";
const CONFIG_FILE_NAME: &str = "config.json";

/// Overlay animation and layout settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Animation durations
    pub timings: OverlayTimings,
    /// Upward shift of the cutout center, in viewport pixels
    pub vertical_offset: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            timings: OverlayTimings::default(),
            vertical_offset: overlay::VERTICAL_OFFSET,
        }
    }
}

impl OverlaySettings {
    /// Cutout layout for full-resolution viewports
    pub fn layout(&self) -> CutoutLayout {
        CutoutLayout {
            vertical_offset: self.vertical_offset,
            ..CutoutLayout::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (Virtual or V4L2)
    pub backend: CameraBackendType,
    /// V4L2 device node; first capture device when unset
    pub device_path: Option<String>,
    /// Still image served by the virtual camera instead of the test pattern
    pub virtual_source: Option<PathBuf>,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// File format of check-in photos
    pub photo_format: EncodingFormat,
    /// JPEG quality preset for check-in photos
    pub photo_quality: EncodingQuality,
    /// Where captured photos are written; `~/Pictures/FaceCapture` when unset
    pub photo_directory: Option<PathBuf>,
    pub overlay: OverlaySettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            device_path: None,
            virtual_source: None,
            mirror_preview: true, // Default to mirrored (selfie mode)
            photo_format: EncodingFormat::default(),
            photo_quality: EncodingQuality::default(),
            photo_directory: None,
            overlay: OverlaySettings::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load config from the default location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from `path`
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// is logged and also yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path` as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("{}: {}", parent.display(), e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Directory captured photos are written to
    pub fn photo_dir(&self) -> PathBuf {
        self.photo_directory
            .clone()
            .unwrap_or_else(crate::storage::default_photo_dir)
    }
}
