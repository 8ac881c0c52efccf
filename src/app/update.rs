// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The `update()` function acts as a dispatcher; the handlers live in the
//! `handlers` submodules organized by concern.

use crate::app::state::{AppModel, Message, Task};

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Vec<Task> {
        match message {
            // ===== Lifecycle =====
            Message::PermissionResolved(state) => self.handle_permission_resolved(state),
            Message::Unmount => self.handle_unmount(),
            Message::Tick(now) => self.handle_tick(now),
            Message::Resized(viewport) => {
                self.viewport = viewport;
                Vec::new()
            }
            Message::ToggleOverlay => self.handle_toggle_overlay(),
            Message::ToggleHelp => {
                self.show_help = !self.show_help;
                Vec::new()
            }

            // ===== Capture =====
            Message::CapturePressed => self.handle_capture_pressed(),
            Message::CaptureFinished { epoch, result } => {
                self.handle_capture_finished(epoch, result)
            }
            Message::OverlayAnimationComplete => self.handle_overlay_animation_complete(),
            Message::PayloadSubmitted { epoch, result } => {
                self.handle_payload_submitted(epoch, result)
            }
        }
    }
}
