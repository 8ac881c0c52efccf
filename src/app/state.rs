// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::config::Config;
use crate::errors::{AppResult, CaptureResult};
use crate::overlay::{FeedbackOverlay, Viewport};
use crate::surface::{CaptureSurface, PermissionState};
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

/// Asynchronous work requested by an update, resolving to the next message
pub type Task = BoxFuture<'static, Message>;

/// Capture state machine
///
/// A capture proceeds once two things are in: the capture result and the
/// end of the overlay's feedback pulse. They can arrive in either order.
#[derive(Debug, Default)]
pub enum CaptureState {
    /// Capture control enabled
    #[default]
    Idle,
    /// Capture running or waiting for the pulse to finish
    Pending {
        /// Mount epoch the capture was started in
        epoch: u64,
        started_at: Instant,
        result: Option<CaptureResult>,
        animation_done: bool,
    },
    /// Payload handed to the sink
    Submitting {
        /// Mount epoch the capture was started in
        epoch: u64,
    },
}

impl CaptureState {
    /// Check if the capture control should be disabled
    pub fn is_busy(&self) -> bool {
        !matches!(self, CaptureState::Idle)
    }

    /// Start a capture in `epoch`
    pub fn start(epoch: u64, animation_done: bool) -> Self {
        CaptureState::Pending {
            epoch,
            started_at: Instant::now(),
            result: None,
            animation_done,
        }
    }

    /// Take the result once both halves of a pending capture are in
    pub fn take_ready(&mut self) -> Option<CaptureResult> {
        let CaptureState::Pending {
            result,
            animation_done: true,
            ..
        } = self
        else {
            return None;
        };
        let result = result.take()?;
        *self = CaptureState::Idle;
        Some(result)
    }
}

/// Severity of a status bar message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Transient status bar message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

/// Check-in screen model
pub struct AppModel {
    /// Configuration data that persists between application runs
    pub config: Config,
    pub(crate) surface: CaptureSurface,
    pub(crate) overlay: FeedbackOverlay,
    /// Receives the overlay's animation-complete signal
    pub(crate) overlay_events: UnboundedReceiver<()>,
    /// User toggle; the overlay is active when enabled and the camera is live
    pub(crate) overlay_enabled: bool,
    pub(crate) capture: CaptureState,
    pub(crate) viewport: Viewport,
    /// Latest tick time; animation inputs are stamped with it
    pub(crate) now: Instant,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) show_help: bool,
    /// Last photo handed to the sink successfully
    pub(crate) last_saved: Option<PathBuf>,
}

/// Messages emitted by frontends and async tasks
#[derive(Debug)]
pub enum Message {
    /// The permission request finished
    PermissionResolved(PermissionState),
    /// User pressed the capture control
    CapturePressed,
    /// A capture finished
    CaptureFinished { epoch: u64, result: CaptureResult },
    /// The overlay's feedback pulse ran to completion
    OverlayAnimationComplete,
    /// The sink finished with a payload
    PayloadSubmitted {
        epoch: u64,
        result: AppResult<PathBuf>,
    },
    /// Frame tick
    Tick(Instant),
    /// Viewport size changed
    Resized(Viewport),
    ToggleOverlay,
    ToggleHelp,
    /// Screen is going away; results still in flight become stale
    Unmount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CaptureError;

    #[test]
    fn test_take_ready_needs_both_halves() {
        let mut state = CaptureState::start(1, false);
        assert!(state.take_ready().is_none());

        if let CaptureState::Pending { result, .. } = &mut state {
            *result = Some(Err(CaptureError::NotReady));
        }
        assert!(state.take_ready().is_none());
        assert!(state.is_busy());

        if let CaptureState::Pending { animation_done, .. } = &mut state {
            *animation_done = true;
        }
        assert!(matches!(state.take_ready(), Some(Err(CaptureError::NotReady))));
        assert!(!state.is_busy());
    }
}
