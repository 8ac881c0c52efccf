// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use super::format_converters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// Synthetic test pattern or still image (always available)
    #[default]
    Virtual,
    /// Video4Linux devices (requires the `v4l2` feature)
    V4l2,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::Virtual => write!(f, "virtual"),
            CameraBackendType::V4l2 => write!(f, "V4L2"),
        }
    }
}

/// Camera access permission
///
/// Starts `Unknown` and is resolved once per mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,           // Device node or virtual source description
    pub driver: Option<String>, // V4L2 driver name, if known
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    /// Common raw format from webcam sensors
    YUYV,
}

impl PixelFormat {
    /// Average bytes per pixel (YUYV packs two pixels into four bytes)
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGB24 => 3,
            PixelFormat::YUYV => 2,
        }
    }
}

/// A single frame from a camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row
    pub stride: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a tightly packed frame
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
            data: Arc::from(data),
            captured_at: Instant::now(),
        }
    }

    /// Get the raw pixel data
    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }

    /// Sample one pixel as RGB, clamping coordinates to the frame
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let data = self.data_slice();

        match self.format {
            PixelFormat::RGB24 => {
                let idx = (y * self.stride + x * 3) as usize;
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::YUYV => {
                // Two pixels share chroma: Y0 U Y1 V
                let pair_x = (x & !1) as usize;
                let base = (y as usize) * (self.stride as usize) + pair_x * 2;
                if base + 3 >= data.len() {
                    return (0, 0, 0);
                }
                let luma = if x & 1 == 0 {
                    data[base]
                } else {
                    data[base + 2]
                };
                format_converters::yuv_to_rgb(luma, data[base + 1], data[base + 3])
            }
        }
    }

    /// Convert to a packed RGB image for encoding
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        let rgb = match self.format {
            PixelFormat::RGB24 if self.stride == self.width * 3 => self.data.to_vec(),
            PixelFormat::YUYV => format_converters::yuyv_to_rgb(&self.data, self.width, self.height, self.stride),
            PixelFormat::RGB24 => {
                let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
                for y in 0..self.height {
                    for x in 0..self.width {
                        let (r, g, b) = self.pixel_rgb(x, y);
                        rgb.extend_from_slice(&[r, g, b]);
                    }
                }
                rgb
            }
        };
        image::RgbImage::from_raw(self.width, self.height, rgb)
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Access to the device was refused
    PermissionDenied(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Failed to initialize backend
    InitializationFailed(String),
    /// The device did not deliver a frame
    CaptureFailed(String),
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "{}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => BackendError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => BackendError::DeviceNotFound(err.to_string()),
            _ => BackendError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_frame_sampling_clamps() {
        let frame = CameraFrame::new(2, 1, PixelFormat::RGB24, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(frame.pixel_rgb(0, 0), (10, 20, 30));
        assert_eq!(frame.pixel_rgb(1, 0), (40, 50, 60));
        assert_eq!(frame.pixel_rgb(9, 9), (40, 50, 60));
    }

    #[test]
    fn test_yuyv_frame_sampling_and_conversion_agree() {
        // Y0 U Y1 V per pixel pair, neutral chroma
        let frame = CameraFrame::new(2, 2, PixelFormat::YUYV, vec![0, 128, 64, 128, 128, 128, 255, 128]);
        assert_eq!(frame.stride, 4);
        assert_eq!(frame.pixel_rgb(1, 0), (64, 64, 64));
        assert_eq!(frame.pixel_rgb(1, 1), (255, 255, 255));

        let image = frame.to_rgb_image().expect("valid frame");
        assert_eq!(image.get_pixel(1, 0).0, [64, 64, 64]);
        assert_eq!(image.get_pixel(0, 1).0, [128, 128, 128]);
    }

    #[test]
    fn test_io_permission_error_maps_to_permission_denied() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(BackendError::from(err), BackendError::PermissionDenied(_)));
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let frame = CameraFrame::new(4, 4, PixelFormat::RGB24, vec![0; 10]);
        assert!(frame.to_rgb_image().is_none());
    }
}
