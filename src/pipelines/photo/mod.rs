// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding for check-in captures

pub mod encoding;

pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
