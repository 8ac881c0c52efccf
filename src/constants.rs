// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Feedback overlay animation timings
pub mod overlay_timing {
    use super::Duration;

    /// Fade-in when the overlay becomes active (D1)
    pub const FADE_IN: Duration = Duration::from_millis(300);

    /// Fade-out when the overlay becomes inactive (D2, shorter than D1)
    pub const FADE_OUT: Duration = Duration::from_millis(200);

    /// Duration of each of the two scale pulse phases (T1)
    pub const PULSE_PHASE: Duration = Duration::from_millis(150);

    /// Backdrop darkening ramp while capturing (T2)
    pub const DARKEN: Duration = Duration::from_millis(300);

    /// Return to rest after capturing ends (T3)
    pub const SETTLE: Duration = Duration::from_millis(200);
}

/// Feedback overlay geometry and rest values
pub mod overlay {
    /// Cutout radius as a fraction of the shorter viewport side
    pub const CUTOUT_RADIUS_FACTOR: f32 = 0.4;

    /// Upward shift of the cutout center, reserving space for bottom controls
    pub const VERTICAL_OFFSET: f32 = 50.0;

    /// Peak cutout scale of the capture pulse
    pub const PULSE_SCALE: f32 = 1.1;

    /// Cutout scale at rest
    pub const REST_SCALE: f32 = 1.0;

    /// Backdrop darkening at rest
    pub const REST_DARKENING: f32 = 0.1;

    /// Backdrop darkening while capturing
    pub const CAPTURE_DARKENING: f32 = 0.2;

    /// Opacity of the dimmed backdrop mask before darkening is applied
    pub const BACKDROP_ALPHA: f32 = 0.6;
}

/// Terminal frontend constants
pub mod terminal {
    use super::Duration;

    /// Event poll timeout, which is also the animation tick interval (~60 Hz)
    pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

    /// Cutout center shift in half-block pixels (one status row = 2 pixels)
    pub const VERTICAL_OFFSET: f32 = 4.0;
}

/// Check-in screen constants
pub mod ui {
    use super::Duration;

    /// How long transient status messages stay visible
    pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);
}

/// Virtual camera constants
pub mod virtual_camera {
    use super::Duration;

    /// Frame interval of the synthetic source (~30fps)
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

    /// Synthetic test pattern width
    pub const PATTERN_WIDTH: u32 = 640;

    /// Synthetic test pattern height
    pub const PATTERN_HEIGHT: u32 = 480;
}

/// Capture timing constants
pub mod timing {
    use super::Duration;

    /// How long a capture waits for a frame newer than the request
    pub const FRAME_TIMEOUT: Duration = Duration::from_secs(3);

    /// How long one V4L2 dequeue may block before the loop checks for stop
    pub const STREAM_TIMEOUT: Duration = Duration::from_millis(500);

    /// Poll interval while waiting for a fresh frame
    pub const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Supported file formats for the virtual camera still-image source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_out_shorter_than_fade_in() {
        assert!(overlay_timing::FADE_OUT < overlay_timing::FADE_IN);
    }

    #[test]
    fn test_image_extensions() {
        assert!(file_formats::is_image_extension("PNG"));
        assert!(file_formats::is_image_extension("jpeg"));
        assert!(!file_formats::is_image_extension("mp4"));
    }
}
