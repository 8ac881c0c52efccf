// SPDX-License-Identifier: MPL-2.0

//! Check-in screen
//!
//! The screen owns the capture surface and the feedback overlay and is the
//! only place the overlay's two flags are decided. Frontends feed it
//! [`Message`]s and run the [`Task`]s it hands back.
//!
//! # Architecture
//!
//! - `state`: AppModel, Message, CaptureState, status messages
//! - `update`: Message dispatch
//! - `handlers`: Handlers grouped by concern (lifecycle, capture)
//!
//! # Capture flow
//!
//! ```text
//! CapturePressed ──▶ capturing = true ──▶ capture task ──▶ CaptureFinished ─┐
//!                         │                                                 ├──▶ proceed
//!                         └──▶ overlay pulse ──▶ OverlayAnimationComplete ──┘
//! ```

mod handlers;
mod state;
mod update;

pub use state::{AppModel, CaptureState, Message, StatusKind, StatusMessage, Task};

use crate::backends::camera::{CameraFrame, CameraPlatform};
use crate::config::Config;
use crate::overlay::{
    CutoutLayout, FeedbackOverlay, OverlayFrame, OverlayInputState, Viewport,
};
use crate::surface::{CaptureSurface, SurfaceView};
use std::sync::Arc;
use std::time::Instant;

impl AppModel {
    /// Create the screen for `platform`
    pub fn new(config: Config, platform: Arc<dyn CameraPlatform>) -> Self {
        let layout = config.overlay.layout();
        Self::with_layout(config, platform, layout)
    }

    /// Create the screen with an explicit cutout layout
    ///
    /// Frontends whose pixel grid differs from the configured one (the
    /// terminal) scale the layout themselves.
    pub fn with_layout(
        config: Config,
        platform: Arc<dyn CameraPlatform>,
        layout: CutoutLayout,
    ) -> Self {
        let (events_tx, overlay_events) = tokio::sync::mpsc::unbounded_channel();
        let overlay = FeedbackOverlay::new(config.overlay.timings, layout).on_animation_complete(
            move || {
                // Receiver lives as long as the model
                let _ = events_tx.send(());
            },
        );
        let surface = CaptureSurface::new(platform)
            .with_format(config.photo_format)
            .with_quality(config.photo_quality);

        Self {
            config,
            surface,
            overlay,
            overlay_events,
            overlay_enabled: true,
            capture: CaptureState::Idle,
            viewport: Viewport::default(),
            now: Instant::now(),
            status: None,
            show_help: false,
            last_saved: None,
        }
    }

    /// Tasks to run when the screen is shown
    pub fn init(&self) -> Vec<Task> {
        let permission = self.surface.request_permission();
        let task: Task = Box::pin(async move { Message::PermissionResolved(permission.await) });
        vec![task]
    }

    pub fn surface_view(&self) -> SurfaceView {
        self.surface.view()
    }

    /// Whether the capture control is enabled
    pub fn can_capture(&self) -> bool {
        self.surface.is_ready() && !self.capture.is_busy()
    }

    pub fn capture_state(&self) -> &CaptureState {
        &self.capture
    }

    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.surface.preview_frame()
    }

    /// Overlay frame for the current viewport, `None` when nothing to draw
    pub fn overlay_frame(&self) -> Option<OverlayFrame> {
        self.overlay.frame(self.viewport, self.now)
    }

    pub fn overlay_inputs(&self) -> OverlayInputState {
        self.overlay.inputs()
    }

    pub fn is_animating(&self) -> bool {
        self.overlay.is_animating(self.now)
    }

    /// Current status message, if it has not expired
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|status| status.expires_at > self.now)
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn last_saved(&self) -> Option<&std::path::Path> {
        self.last_saved.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.surface.epoch()
    }
}
