// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSurface    │  ← Permission gate, in-flight guard, encoding
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraPlatform Trait│  ← Enumeration, permission, open
//! └──────────┬──────────┘
//!            │ open()
//!            ▼
//! ┌─────────────────────┐
//! │  CameraHandle Trait │  ← Preview frames, single-frame capture
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!  ┌─────────┐ ┌──────┐
//!  │ Virtual │ │ V4L2 │
//!  └─────────┘ └──────┘
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod types;
#[cfg(feature = "v4l2")]
pub mod v4l2;
pub mod virtual_camera;

pub use types::*;

use crate::config::Config;
use crate::constants::timing;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

/// Access to a family of camera devices
pub trait CameraPlatform: Send + Sync {
    /// Which backend this is
    fn backend_type(&self) -> CameraBackendType;

    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Ask for camera access
    ///
    /// `Ok(Denied)` is a refusal; `Err` means the platform could not answer.
    /// Both end up as `Denied` at the capture surface.
    fn request_permission(&self) -> BackendResult<PermissionState>;

    /// Open the configured camera and start its preview loop
    fn open(&self) -> BackendResult<Box<dyn CameraHandle>>;
}

/// An open camera
///
/// Dropping the handle stops its preview loop and releases the device.
pub trait CameraHandle: Send + Sync {
    /// The device this handle was opened on
    fn device(&self) -> &CameraDevice;

    /// Capture a single frame (blocking)
    fn capture_frame(&self) -> BackendResult<CameraFrame>;

    /// Most recent preview frame, if one arrived yet
    fn preview_frame(&self) -> Option<CameraFrame>;
}

/// Latest-frame slot shared between a preview loop and its handle
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    inner: Arc<Mutex<Option<CameraFrame>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: CameraFrame) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(frame);
    }

    /// Clone of the current frame
    pub fn get(&self) -> Option<CameraFrame> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Wait up to `timeout` for a frame captured after `since`
    ///
    /// A frame already in the slot predates the request, and a stalled
    /// stream would hand it out again, so only newer frames count.
    pub fn wait_after(&self, since: Instant, timeout: Duration) -> BackendResult<CameraFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(frame) = self.get().filter(|frame| frame.captured_at > since) {
                return Ok(frame);
            }
            if Instant::now() >= deadline {
                return Err(BackendError::CaptureFailed(
                    "No frame received from camera".to_string(),
                ));
            }
            std::thread::sleep(timing::FRAME_POLL_INTERVAL);
        }
    }
}

/// Build the platform selected in the configuration
pub fn create_platform(config: &Config) -> BackendResult<Arc<dyn CameraPlatform>> {
    info!(backend = %config.backend, "Creating camera platform");

    match config.backend {
        CameraBackendType::Virtual => {
            let source = match &config.virtual_source {
                Some(path) => virtual_camera::VirtualSource::Image(path.clone()),
                None => virtual_camera::VirtualSource::TestPattern,
            };
            Ok(Arc::new(virtual_camera::VirtualCameraPlatform::new(source)))
        }
        #[cfg(feature = "v4l2")]
        CameraBackendType::V4l2 => Ok(Arc::new(v4l2::V4l2Platform::new(
            config.device_path.clone(),
        ))),
        #[cfg(not(feature = "v4l2"))]
        CameraBackendType::V4l2 => Err(BackendError::NotAvailable(
            "built without the v4l2 feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(value: u8) -> CameraFrame {
        CameraFrame::new(1, 1, PixelFormat::RGB24, vec![value; 3])
    }

    #[test]
    fn test_latest_frame_wait_times_out() {
        let slot = LatestFrame::new();
        let result = slot.wait_after(Instant::now(), Duration::from_millis(30));
        assert!(matches!(result, Err(BackendError::CaptureFailed(_))));
    }

    #[test]
    fn test_latest_frame_returns_newest() {
        let since = Instant::now();
        let slot = LatestFrame::new();
        slot.publish(pixel(1));
        slot.publish(pixel(2));
        let frame = slot.wait_after(since, Duration::from_millis(10)).expect("frame");
        assert_eq!(frame.data_slice(), &[2, 2, 2]);
    }

    #[test]
    fn test_frame_older_than_request_is_not_returned() {
        let slot = LatestFrame::new();
        slot.publish(pixel(1));
        std::thread::sleep(Duration::from_millis(2));

        // Stalled stream: only the stale frame is ever there
        let result = slot.wait_after(Instant::now(), Duration::from_millis(30));
        assert!(matches!(result, Err(BackendError::CaptureFailed(_))));

        let requested_at = Instant::now();
        let publisher = slot.clone();
        let producer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            publisher.publish(pixel(9));
        });
        let frame = slot
            .wait_after(requested_at, Duration::from_secs(1))
            .expect("fresh frame");
        assert_eq!(frame.data_slice(), &[9, 9, 9]);
        producer.join().expect("producer thread");
    }

    #[test]
    fn test_default_config_creates_virtual_platform() {
        let platform = create_platform(&Config::default()).expect("virtual is always available");
        assert_eq!(platform.backend_type(), CameraBackendType::Virtual);
    }
}
