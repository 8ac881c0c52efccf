// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for captured frames
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Encoding   │ ──▶ │ ImagePayload │
//! │ (RGB / YUYV) │     │  - →RGB           │     │  (JPEG/PNG)  │
//! │              │     │  - JPEG/PNG       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Encoding is CPU-bound and always runs on tokio's blocking pool.

pub mod photo;
