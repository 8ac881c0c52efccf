// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion to packed RGB
//!
//! Frames are converted on the CPU only when a capture is encoded; the
//! terminal preview samples pixels directly via `CameraFrame::pixel_rgb`.

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

/// Convert YUYV (YUV 4:2:2) to RGB
///
/// YUYV format: Y0 U Y1 V - each 4-byte group encodes 2 pixels.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);

    for row in 0..height as usize {
        let start = row * stride as usize;
        let end = (start + width as usize * 2).min(data.len());
        let Some(line) = data.get(start..end) else {
            break;
        };

        for chunk in line.chunks_exact(4) {
            let (u, v) = (chunk[1], chunk[3]);
            for luma in [chunk[0], chunk[2]] {
                let (r, g, b) = yuv_to_rgb(luma, u, v);
                rgb.extend_from_slice(&[r, g, b]);
            }
        }
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_chroma_is_gray() {
        assert_eq!(yuv_to_rgb(128, 128, 128), (128, 128, 128));
        assert_eq!(yuv_to_rgb(0, 128, 128), (0, 0, 0));
        assert_eq!(yuv_to_rgb(255, 128, 128), (255, 255, 255));
    }

    #[test]
    fn test_yuyv_two_pixels_per_group() {
        let data = [16, 128, 235, 128];
        let rgb = yuyv_to_rgb(&data, 2, 1, 4);
        assert_eq!(rgb, vec![16, 16, 16, 235, 235, 235]);
    }

    #[test]
    fn test_yuyv_respects_stride() {
        // Two rows of one pixel pair, each padded to 8 bytes
        let data = [16, 128, 16, 128, 9, 9, 9, 9, 235, 128, 235, 128, 9, 9, 9, 9];
        let rgb = yuyv_to_rgb(&data, 2, 2, 8);
        assert_eq!(rgb, vec![16, 16, 16, 16, 16, 16, 235, 235, 235, 235, 235, 235]);
    }
}
