// SPDX-License-Identifier: GPL-3.0-only

//! Screen lifecycle handlers
//!
//! Handles permission, mount/unmount, ticks, and the overlay toggle.

use crate::app::state::{AppModel, CaptureState, Message, StatusKind, StatusMessage, Task};
use crate::constants::ui;
use crate::fl;
use crate::overlay::OverlayInputState;
use crate::surface::PermissionState;
use std::time::Instant;
use tracing::{debug, info, warn};

impl AppModel {
    // =========================================================================
    // Lifecycle Handlers
    // =========================================================================

    /// Current instant, never behind the last tick
    pub(crate) fn clock(&mut self) -> Instant {
        self.now = self.now.max(Instant::now());
        self.now
    }

    /// Derive the overlay flags from screen state and push them
    pub(crate) fn push_overlay_inputs(&mut self) {
        let inputs = OverlayInputState {
            active: self.overlay_enabled && self.surface.is_ready(),
            capturing: matches!(self.capture, CaptureState::Pending { .. }),
        };
        let now = self.clock();
        self.overlay.set_inputs(inputs, now);
    }

    pub(crate) fn set_status(&mut self, text: String, kind: StatusKind) {
        let expires_at = self.clock() + ui::STATUS_MESSAGE_TIMEOUT;
        self.status = Some(StatusMessage {
            text,
            kind,
            expires_at,
        });
    }

    pub(crate) fn handle_permission_resolved(&mut self, state: PermissionState) -> Vec<Task> {
        self.surface.set_permission(state);

        match self.surface.permission() {
            PermissionState::Granted => match self.surface.mount() {
                Ok(()) => {
                    info!(epoch = self.surface.epoch(), "Check-in screen live");
                    self.push_overlay_inputs();
                }
                Err(e) => {
                    warn!(error = %e, "Camera could not be opened");
                    self.set_status(
                        fl!("status-camera-unavailable", error = e.to_string()),
                        StatusKind::Error,
                    );
                }
            },
            PermissionState::Denied => {
                info!("Camera permission denied, showing explanation");
            }
            PermissionState::Unknown => {
                debug!("Permission still unknown");
            }
        }

        Vec::new()
    }

    pub(crate) fn handle_unmount(&mut self) -> Vec<Task> {
        if self.capture.is_busy() {
            info!("Unmounting with a capture pending, its result will be discarded");
        }
        self.surface.unmount();
        self.capture = CaptureState::Idle;
        self.push_overlay_inputs();
        Vec::new()
    }

    pub(crate) fn handle_tick(&mut self, now: Instant) -> Vec<Task> {
        self.now = self.now.max(now);
        self.overlay.tick(self.now);

        let mut tasks = Vec::new();
        while self.overlay_events.try_recv().is_ok() {
            tasks.extend(self.update(Message::OverlayAnimationComplete));
        }

        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= self.now)
        {
            self.status = None;
        }

        tasks
    }

    pub(crate) fn handle_toggle_overlay(&mut self) -> Vec<Task> {
        self.overlay_enabled = !self.overlay_enabled;
        debug!(enabled = self.overlay_enabled, "Overlay toggled");
        self.push_overlay_inputs();

        let text = if self.overlay_enabled {
            fl!("overlay-on")
        } else {
            fl!("overlay-off")
        };
        self.set_status(text, StatusKind::Info);

        // A hidden overlay drops its pulse without completing it
        if !self.overlay_enabled {
            return self.mark_animation_done();
        }
        Vec::new()
    }
}
