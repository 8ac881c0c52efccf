// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Turns a captured frame into encoded bytes:
//! - JPEG (with quality control)
//! - PNG (lossless)
//!
//! Encoding is synchronous; callers run it on a blocking worker.

use crate::backends::camera::CameraFrame;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with JPEG format and high quality
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: EncodingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set encoding quality (only affects JPEG)
    pub fn with_quality(mut self, quality: EncodingQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode a camera frame
    pub fn encode_frame(&self, frame: &CameraFrame) -> Result<EncodedImage, String> {
        let image = frame.to_rgb_image().ok_or_else(|| {
            format!(
                "Frame data does not match {}x{} {:?}",
                frame.width, frame.height, frame.format
            )
        })?;

        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(&image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(&image)?,
        };

        debug!(size = data.len(), format = ?self.format, "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| format!("JPEG encoding failed: {}", e))?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: &RgbImage) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();

        image
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Png,
            )
            .map_err(|e| format!("PNG encoding failed: {}", e))?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::PixelFormat;

    fn flat_frame() -> CameraFrame {
        CameraFrame::new(16, 8, PixelFormat::RGB24, vec![128; 16 * 8 * 3])
    }

    #[test]
    fn test_jpeg_has_soi_marker() {
        let encoded = PhotoEncoder::new().encode_frame(&flat_frame()).expect("encodes");
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        assert_eq!((encoded.width, encoded.height), (16, 8));
    }

    #[test]
    fn test_png_decodes_back() {
        let encoded = PhotoEncoder::new()
            .with_format(EncodingFormat::Png)
            .encode_frame(&flat_frame())
            .expect("encodes");
        let decoded = image::load_from_memory(&encoded.data).expect("valid png");
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn test_truncated_frame_is_an_error() {
        let frame = CameraFrame::new(16, 8, PixelFormat::RGB24, vec![0; 12]);
        assert!(PhotoEncoder::new().encode_frame(&frame).is_err());
    }

    #[test]
    fn test_quality_ordering() {
        assert!(EncodingQuality::Low.jpeg_quality() < EncodingQuality::High.jpeg_quality());
    }
}
