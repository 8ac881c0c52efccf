// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! Produces preview frames without hardware, either a moving test pattern
//! or a still image loaded from disk. The permission answer and capture
//! failures are configurable so every path of the check-in flow can be
//! exercised on machines without a webcam.

use super::frame_loop::{FrameLoopController, LoopAction};
use super::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFrame, CameraHandle,
    CameraPlatform, LatestFrame, PermissionState, PixelFormat,
};
use crate::constants::{file_formats, timing, virtual_camera as vc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Where virtual frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualSource {
    /// Animated gradient with a moving bar
    TestPattern,
    /// A still image file
    Image(PathBuf),
}

/// Scripted answer to a permission request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VirtualPermission {
    #[default]
    Grant,
    Deny,
    /// The permission service itself fails
    Unavailable(String),
}

/// Virtual camera platform
#[derive(Debug, Clone)]
pub struct VirtualCameraPlatform {
    source: VirtualSource,
    permission: VirtualPermission,
    capture_failure: Option<String>,
    capture_delay: Duration,
}

impl VirtualCameraPlatform {
    pub fn new(source: VirtualSource) -> Self {
        Self {
            source,
            permission: VirtualPermission::default(),
            capture_failure: None,
            capture_delay: Duration::ZERO,
        }
    }

    /// Answer permission requests with `permission`
    pub fn with_permission(mut self, permission: VirtualPermission) -> Self {
        self.permission = permission;
        self
    }

    /// Make every capture fail with `reason`
    pub fn with_capture_failure(mut self, reason: impl Into<String>) -> Self {
        self.capture_failure = Some(reason.into());
        self
    }

    /// Simulate sensor latency on each capture
    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.capture_delay = delay;
        self
    }

    fn device(&self) -> CameraDevice {
        let path = match &self.source {
            VirtualSource::TestPattern => "virtual:test-pattern".to_string(),
            VirtualSource::Image(path) => format!("virtual:{}", path.display()),
        };
        CameraDevice {
            name: "Virtual Camera".to_string(),
            path,
            driver: None,
        }
    }
}

impl CameraPlatform for VirtualCameraPlatform {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Virtual
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![self.device()]
    }

    fn request_permission(&self) -> BackendResult<PermissionState> {
        match &self.permission {
            VirtualPermission::Grant => Ok(PermissionState::Granted),
            VirtualPermission::Deny => Ok(PermissionState::Denied),
            VirtualPermission::Unavailable(reason) => {
                Err(BackendError::NotAvailable(reason.clone()))
            }
        }
    }

    fn open(&self) -> BackendResult<Box<dyn CameraHandle>> {
        let frames = LatestFrame::new();
        let publisher = frames.clone();

        let frame_loop = match &self.source {
            VirtualSource::TestPattern => FrameLoopController::start_with_init(
                "virtual-camera",
                Some(vc::FRAME_INTERVAL),
                || Ok(0u64),
                move |index| {
                    publisher.publish(test_pattern(vc::PATTERN_WIDTH, vc::PATTERN_HEIGHT, *index));
                    *index += 1;
                    LoopAction::Continue
                },
            ),
            VirtualSource::Image(path) => {
                let still = load_image_frame(path)?;
                FrameLoopController::start(
                    "virtual-camera-still",
                    Some(vc::FRAME_INTERVAL),
                    move || {
                        let mut frame = still.clone();
                        frame.captured_at = Instant::now();
                        publisher.publish(frame);
                        LoopAction::Continue
                    },
                )
            }
        };

        let device = self.device();
        info!(device = %device.path, "Virtual camera opened");

        Ok(Box::new(VirtualCameraHandle {
            device,
            frames,
            capture_failure: self.capture_failure.clone(),
            capture_delay: self.capture_delay,
            _frame_loop: frame_loop,
        }))
    }
}

/// Open virtual camera
pub struct VirtualCameraHandle {
    device: CameraDevice,
    frames: LatestFrame,
    capture_failure: Option<String>,
    capture_delay: Duration,
    _frame_loop: FrameLoopController,
}

impl CameraHandle for VirtualCameraHandle {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        let requested_at = Instant::now();
        if !self.capture_delay.is_zero() {
            std::thread::sleep(self.capture_delay);
        }
        if let Some(reason) = &self.capture_failure {
            debug!(reason = %reason, "Virtual capture failing as configured");
            return Err(BackendError::CaptureFailed(reason.clone()));
        }
        self.frames.wait_after(requested_at, timing::FRAME_TIMEOUT)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        self.frames.get()
    }
}

/// Load a still image as an RGB frame
pub fn load_image_frame(path: &Path) -> BackendResult<CameraFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(BackendError::Other(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    let image = image::open(path)
        .map_err(|e| BackendError::InitializationFailed(format!("{}: {}", path.display(), e)))?
        .to_rgb8();
    let (width, height) = image.dimensions();

    debug!(path = %path.display(), width, height, "Loaded virtual camera image");
    Ok(CameraFrame::new(width, height, PixelFormat::RGB24, image.into_raw()))
}

/// Generate one frame of the animated test pattern
pub fn test_pattern(width: u32, height: u32, index: u64) -> CameraFrame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    let bar_x = ((index * 8) % width.max(1) as u64) as u32;
    let blue = ((index * 4) % 256) as u8;

    for y in 0..height {
        for x in 0..width {
            if x >= bar_x && x < bar_x + 16 {
                data.extend_from_slice(&[240, 240, 240]);
            } else {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                data.extend_from_slice(&[r, g, blue]);
            }
        }
    }

    CameraFrame::new(width, height, PixelFormat::RGB24, data)
}
