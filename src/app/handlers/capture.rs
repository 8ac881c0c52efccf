// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles the capture control, capture results, the overlay's completion
//! signal, and handing payloads to the sink.

use crate::app::state::{AppModel, CaptureState, Message, StatusKind, Task};
use crate::errors::{AppResult, CaptureError, CaptureResult};
use crate::fl;
use crate::storage;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Localized text for a capture error
pub(crate) fn capture_error_text(err: &CaptureError) -> String {
    match err {
        CaptureError::NotReady => fl!("capture-error-not-ready"),
        CaptureError::InProgress => fl!("capture-error-in-progress"),
        CaptureError::CaptureFailed(reason) => {
            fl!("capture-error-failed", reason = reason.clone())
        }
    }
}

impl AppModel {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    pub(crate) fn handle_capture_pressed(&mut self) -> Vec<Task> {
        if self.capture.is_busy() {
            debug!("Capture already pending, ignoring");
            return Vec::new();
        }

        if !self.surface.is_ready() {
            warn!("Capture requested before the camera is ready");
            self.set_status(capture_error_text(&CaptureError::NotReady), StatusKind::Error);
            return Vec::new();
        }

        let epoch = self.surface.epoch();
        let capture = self.surface.capture();

        // Without a visible overlay no pulse runs, so there is nothing to wait for
        let overlay_pulses = self.overlay.inputs().active;
        self.capture = CaptureState::start(epoch, !overlay_pulses);
        self.push_overlay_inputs();

        info!(epoch, "Capture started");

        let task: Task = Box::pin(async move {
            Message::CaptureFinished {
                epoch,
                result: capture.await,
            }
        });
        vec![task]
    }

    pub(crate) fn handle_capture_finished(
        &mut self,
        epoch: u64,
        result: CaptureResult,
    ) -> Vec<Task> {
        let current = self.surface.epoch();

        match &mut self.capture {
            CaptureState::Pending {
                epoch: pending_epoch,
                started_at,
                result: slot,
                ..
            } if *pending_epoch == epoch && epoch == current => {
                debug!(
                    epoch,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Capture result received"
                );
                *slot = Some(result);
            }
            _ => {
                debug!(epoch, current, "Discarding stale capture result");
                return Vec::new();
            }
        }

        self.proceed_if_ready()
    }

    pub(crate) fn handle_overlay_animation_complete(&mut self) -> Vec<Task> {
        if !self.capture.is_busy() {
            debug!("Overlay animation complete with no capture pending");
            return Vec::new();
        }
        self.mark_animation_done()
    }

    /// Stop waiting for the overlay pulse of the pending capture
    pub(crate) fn mark_animation_done(&mut self) -> Vec<Task> {
        match &mut self.capture {
            CaptureState::Pending { animation_done, .. } => *animation_done = true,
            _ => return Vec::new(),
        }
        self.proceed_if_ready()
    }

    /// Continue once both the capture result and the pulse are in
    fn proceed_if_ready(&mut self) -> Vec<Task> {
        let Some(result) = self.capture.take_ready() else {
            return Vec::new();
        };

        match result {
            Ok(payload) => {
                let epoch = self.surface.epoch();
                self.capture = CaptureState::Submitting { epoch };
                self.push_overlay_inputs();

                let output_dir = self.config.photo_dir();
                info!(epoch, id = %payload.id, dir = %output_dir.display(), "Submitting check-in photo");
                let task: Task = Box::pin(async move {
                    Message::PayloadSubmitted {
                        epoch,
                        result: storage::save_payload(payload, output_dir).await,
                    }
                });
                vec![task]
            }
            Err(e) => {
                self.push_overlay_inputs();
                self.set_status(capture_error_text(&e), StatusKind::Error);
                Vec::new()
            }
        }
    }

    pub(crate) fn handle_payload_submitted(
        &mut self,
        epoch: u64,
        result: AppResult<PathBuf>,
    ) -> Vec<Task> {
        let current = self.surface.epoch();
        match self.capture {
            CaptureState::Submitting {
                epoch: submitting_epoch,
            } if submitting_epoch == epoch && epoch == current => {
                self.capture = CaptureState::Idle;
            }
            _ => {
                debug!(epoch, current, ok = result.is_ok(), "Discarding stale submit result");
                return Vec::new();
            }
        }

        match result {
            Ok(path) => {
                info!(path = %path.display(), "Check-in photo submitted");
                self.set_status(
                    fl!("status-saved", path = path.display().to_string()),
                    StatusKind::Info,
                );
                self.last_saved = Some(path);
            }
            Err(e) => {
                error!(error = %e, "Failed to submit check-in photo");
                self.set_status(
                    fl!("status-save-failed", error = e.to_string()),
                    StatusKind::Error,
                );
            }
        }

        Vec::new()
    }
}
