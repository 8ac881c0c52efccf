// SPDX-License-Identifier: GPL-3.0-only

//! Capture surface
//!
//! Wraps a camera platform behind the three things the check-in screen
//! needs: a permission gate, a readiness signal and an asynchronous
//! single-shot `capture()`.
//!
//! ```text
//! request_permission() ──▶ Granted ──▶ mount() ──▶ Live ──▶ capture()
//!          │                                                   │
//!          └──────▶ Denied (static state)          spawn_blocking(capture + encode)
//! ```
//!
//! At most one capture runs at a time. Each mount gets a new epoch so the
//! caller can tell results of a previous mount from current ones.

use crate::backends::camera::{
    BackendError, BackendResult, CameraFrame, CameraHandle, CameraPlatform,
};
use crate::errors::{CaptureError, CaptureResult};
use crate::pipelines::photo::{EncodingFormat, EncodingQuality, PhotoEncoder};
use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub use crate::backends::camera::PermissionState;

/// Encoded image returned by a successful capture
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Capture id
    pub id: Uuid,
    /// Encoded bytes
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub format: EncodingFormat,
    pub captured_at: DateTime<Local>,
}

impl ImagePayload {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What the surface should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceView {
    /// Permission not answered yet, or granted but no camera open
    Pending,
    /// Live preview
    Live,
    /// Static explanation, no preview
    PermissionDenied,
}

/// Clears the in-flight flag when dropped
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Camera capture surface
pub struct CaptureSurface {
    platform: Arc<dyn CameraPlatform>,
    permission: PermissionState,
    handle: Option<Arc<dyn CameraHandle>>,
    encoder: PhotoEncoder,
    in_flight: Arc<AtomicBool>,
    epoch: u64,
}

impl std::fmt::Debug for CaptureSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSurface")
            .field("backend", &self.platform.backend_type())
            .field("permission", &self.permission)
            .field("ready", &self.handle.is_some())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl CaptureSurface {
    pub fn new(platform: Arc<dyn CameraPlatform>) -> Self {
        Self {
            platform,
            permission: PermissionState::Unknown,
            handle: None,
            encoder: PhotoEncoder::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            epoch: 0,
        }
    }

    /// Set the file format of captured photos
    pub fn with_format(mut self, format: EncodingFormat) -> Self {
        self.encoder = self.encoder.with_format(format);
        self
    }

    /// Set the JPEG quality of captured photos
    pub fn with_quality(mut self, quality: EncodingQuality) -> Self {
        self.encoder = self.encoder.with_quality(quality);
        self
    }

    /// Current permission state
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Resolve camera permission
    ///
    /// Asks the platform once; later calls return the cached answer. A
    /// platform failure counts as a refusal.
    pub fn request_permission(
        &self,
    ) -> impl Future<Output = PermissionState> + Send + 'static + use<> {
        let cached = self.permission;
        let platform = Arc::clone(&self.platform);

        async move {
            if cached != PermissionState::Unknown {
                return cached;
            }

            let answer =
                tokio::task::spawn_blocking(move || platform.request_permission()).await;

            match answer {
                Ok(Ok(state)) => {
                    info!(?state, "Camera permission resolved");
                    state
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Permission request failed, treating as denied");
                    PermissionState::Denied
                }
                Err(e) => {
                    warn!(error = %e, "Permission task failed, treating as denied");
                    PermissionState::Denied
                }
            }
        }
    }

    /// Record the answer of [`Self::request_permission`]
    ///
    /// Only the first answer is kept.
    pub fn set_permission(&mut self, state: PermissionState) {
        if self.permission == PermissionState::Unknown {
            self.permission = state;
        } else if self.permission != state {
            debug!(current = ?self.permission, ignored = ?state, "Permission already resolved");
        }
    }

    /// Resolve permission and record it in one step
    pub async fn resolve_permission(&mut self) -> PermissionState {
        let state = self.request_permission().await;
        self.set_permission(state);
        self.permission
    }

    /// Open the camera if permission was granted
    ///
    /// On failure no handle is installed and the surface stays not ready,
    /// so `capture()` keeps reporting `NotReady`.
    pub fn mount(&mut self) -> BackendResult<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        if !self.permission.is_granted() {
            debug!(permission = ?self.permission, "Not mounting without permission");
            return Err(BackendError::PermissionDenied(format!(
                "camera permission is {:?}",
                self.permission
            )));
        }

        self.epoch += 1;
        let handle = self.platform.open().inspect_err(|e| {
            error!(error = %e, "Failed to open camera");
        })?;

        info!(
            device = %handle.device().name,
            epoch = self.epoch,
            "Capture surface mounted"
        );
        self.handle = Some(Arc::from(handle));
        Ok(())
    }

    /// Release the camera
    ///
    /// Captures still running finish on their worker, but their results
    /// carry the old epoch.
    pub fn unmount(&mut self) {
        if self.handle.take().is_some() {
            info!(epoch = self.epoch, "Capture surface unmounted");
        }
        self.epoch += 1;
        self.permission = PermissionState::Unknown;
    }

    /// Whether a camera is open
    pub fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a capture is running
    pub fn is_capturing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mount generation, bumped on every mount and unmount
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn view(&self) -> SurfaceView {
        match self.permission {
            PermissionState::Denied => SurfaceView::PermissionDenied,
            PermissionState::Granted if self.handle.is_some() => SurfaceView::Live,
            _ => SurfaceView::Pending,
        }
    }

    /// Latest preview frame
    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.handle.as_ref().and_then(|handle| handle.preview_frame())
    }

    /// Capture and encode a single photo
    ///
    /// The checks run immediately: without an open camera the future
    /// resolves to `NotReady` and nothing else happens, and while another
    /// capture is running it resolves to `InProgress`.
    pub fn capture(&self) -> impl Future<Output = CaptureResult> + Send + 'static + use<> {
        let prepared = match &self.handle {
            None => Err(CaptureError::NotReady),
            Some(handle) => match InFlightGuard::acquire(&self.in_flight) {
                None => Err(CaptureError::InProgress),
                Some(guard) => Ok((Arc::clone(handle), guard)),
            },
        };
        let encoder = self.encoder;

        async move {
            let (handle, _guard) = prepared?;

            debug!("Capture started");
            let result =
                tokio::task::spawn_blocking(move || capture_blocking(handle.as_ref(), encoder))
                    .await
                    .map_err(|e| {
                        CaptureError::CaptureFailed(format!("Capture task error: {}", e))
                    })?;

            match &result {
                Ok(payload) => info!(
                    id = %payload.id,
                    width = payload.width,
                    height = payload.height,
                    size = payload.len(),
                    "Capture complete"
                ),
                Err(e) => warn!(error = %e, "Capture failed"),
            }
            result
        }
    }
}

fn capture_blocking(handle: &dyn CameraHandle, encoder: PhotoEncoder) -> CaptureResult {
    let frame = handle.capture_frame()?;
    let encoded = encoder
        .encode_frame(&frame)
        .map_err(CaptureError::CaptureFailed)?;

    Ok(ImagePayload {
        id: Uuid::new_v4(),
        data: Arc::from(encoded.data),
        width: encoded.width,
        height: encoded.height,
        format: encoded.format,
        captured_at: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::virtual_camera::{
        VirtualCameraPlatform, VirtualPermission, VirtualSource,
    };
    use std::time::Duration;

    fn surface(platform: VirtualCameraPlatform) -> CaptureSurface {
        CaptureSurface::new(Arc::new(platform))
    }

    fn pattern() -> VirtualCameraPlatform {
        VirtualCameraPlatform::new(VirtualSource::TestPattern)
    }

    #[tokio::test]
    async fn test_granted_mount_and_capture() {
        let mut surface = surface(pattern());
        assert_eq!(surface.view(), SurfaceView::Pending);

        assert_eq!(surface.resolve_permission().await, PermissionState::Granted);
        surface.mount().expect("mounts");
        assert_eq!(surface.view(), SurfaceView::Live);

        let payload = surface.capture().await.expect("capture succeeds");
        assert_eq!(&payload.data[..2], &[0xFF, 0xD8]);
        assert!(!surface.is_capturing());
    }

    #[tokio::test]
    async fn test_not_ready_has_no_side_effects() {
        let surface = surface(pattern());
        let result = surface.capture().await;
        assert_eq!(result.err(), Some(CaptureError::NotReady));
        assert!(!surface.is_capturing());
    }

    #[tokio::test]
    async fn test_denied_permission_never_mounts() {
        let mut surface = surface(pattern().with_permission(VirtualPermission::Deny));
        assert_eq!(surface.resolve_permission().await, PermissionState::Denied);
        assert!(matches!(surface.mount(), Err(BackendError::PermissionDenied(_))));
        assert_eq!(surface.view(), SurfaceView::PermissionDenied);
        assert_eq!(surface.capture().await.err(), Some(CaptureError::NotReady));
    }

    #[tokio::test]
    async fn test_permission_failure_is_denied() {
        let mut surface = surface(
            pattern().with_permission(VirtualPermission::Unavailable("portal gone".into())),
        );
        assert_eq!(surface.resolve_permission().await, PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_permission_is_cached() {
        let mut surface = surface(pattern());
        surface.resolve_permission().await;
        surface.set_permission(PermissionState::Denied);
        assert_eq!(surface.permission(), PermissionState::Granted);
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_reason() {
        let mut surface = surface(pattern().with_capture_failure("sensor timeout"));
        surface.resolve_permission().await;
        surface.mount().expect("mounts");

        match surface.capture().await {
            Err(CaptureError::CaptureFailed(reason)) => assert!(reason.contains("sensor timeout")),
            other => panic!("unexpected result: {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_concurrent_capture_is_rejected() {
        let mut surface = surface(pattern().with_capture_delay(Duration::from_millis(100)));
        surface.resolve_permission().await;
        surface.mount().expect("mounts");

        let first = surface.capture();
        let second = surface.capture();
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(second.err(), Some(CaptureError::InProgress));
        assert!(!surface.is_capturing());
    }

    #[tokio::test]
    async fn test_unmount_bumps_epoch() {
        let mut surface = surface(pattern());
        surface.resolve_permission().await;
        surface.mount().expect("mounts");
        let mounted = surface.epoch();

        surface.unmount();
        assert!(surface.epoch() > mounted);
        assert!(!surface.is_ready());
        assert_eq!(surface.permission(), PermissionState::Unknown);
    }
}
