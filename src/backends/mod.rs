// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! The backend layer hides how frames are obtained. The capture surface
//! only sees the [`camera::CameraPlatform`] and [`camera::CameraHandle`]
//! traits:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Check-in screen / CLI            │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │ Virtual camera  │  │   V4L2 (opt-in)  │  │
//! │  └─────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
