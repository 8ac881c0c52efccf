// SPDX-License-Identifier: MPL-2.0

//! Face check-in capture
//!
//! This library provides the capture interaction of a face check-in screen:
//! a camera capture surface with a permission gate, and the animated
//! face-frame overlay that gives feedback while a photo is taken.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`surface`]: Permission, readiness and single-shot capture
//! - [`overlay`]: Feedback overlay state machine and cutout geometry
//! - [`animation`]: Time-based animated values
//! - [`app`]: Check-in screen model tying surface and overlay together
//! - [`backends`]: Camera backend abstraction (virtual, V4L2)
//! - [`pipelines`]: Photo encoding
//! - [`config`]: User configuration handling
//! - [`storage`]: Saving captured photos
//! - [`terminal`]: Terminal frontend
//!
//! # Example
//!
//! ```ignore
//! let platform = create_platform(&config)?;
//! let mut surface = CaptureSurface::new(platform);
//! if surface.resolve_permission().await.is_granted() {
//!     surface.mount()?;
//!     let payload = surface.capture().await?;
//! }
//! ```

pub mod animation;
pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod overlay;
pub mod pipelines;
pub mod storage;
pub mod surface;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use errors::{AppError, AppResult, CaptureError, CaptureResult};
pub use overlay::{FeedbackOverlay, OverlayInputState};
pub use surface::{CaptureSurface, ImagePayload, PermissionState};
