// SPDX-License-Identifier: GPL-3.0-only

//! Video4Linux camera backend
//!
//! Talks to `/dev/video*` nodes directly through the v4l crate. Permission
//! maps onto the device node's access rights: a node the user may not open
//! is a denied permission, not an error.

use super::frame_loop::{FrameLoopController, LoopAction};
use super::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFrame, CameraHandle,
    CameraPlatform, LatestFrame, PermissionState, PixelFormat,
};
use crate::constants::{timing, virtual_camera as vc};
use std::time::Instant;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{FourCC, Format};

const DEFAULT_DEVICE: &str = "/dev/video0";

/// V4L2 camera platform
#[derive(Debug, Clone)]
pub struct V4l2Platform {
    device_path: String,
}

impl V4l2Platform {
    /// Use `device_path`, or the first video node when `None`
    pub fn new(device_path: Option<String>) -> Self {
        let device_path = device_path.unwrap_or_else(|| {
            v4l::context::enum_devices()
                .into_iter()
                .map(|node| node.path().to_string_lossy().to_string())
                .next()
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string())
        });
        Self { device_path }
    }
}

impl CameraPlatform for V4l2Platform {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let mut devices: Vec<CameraDevice> = v4l::context::enum_devices()
            .into_iter()
            .filter_map(|node| {
                let path = node.path().to_string_lossy().to_string();
                let dev = Device::with_path(&path).ok()?;
                let caps = dev.query_caps().ok()?;
                if !caps
                    .capabilities
                    .contains(v4l::capability::Flags::VIDEO_CAPTURE)
                {
                    return None;
                }
                Some(CameraDevice {
                    name: node.name().unwrap_or_else(|| caps.card.clone()),
                    path,
                    driver: Some(caps.driver),
                })
            })
            .collect();

        devices.sort_by(|a, b| a.path.cmp(&b.path));
        devices
    }

    fn request_permission(&self) -> BackendResult<PermissionState> {
        match std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device_path)
        {
            Ok(_) => Ok(PermissionState::Granted),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                warn!(
                    path = %self.device_path,
                    "Camera node not accessible, user may need to be in the 'video' group"
                );
                Ok(PermissionState::Denied)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn open(&self) -> BackendResult<Box<dyn CameraHandle>> {
        let dev = Device::with_path(&self.device_path)?;
        let caps = dev.query_caps()?;
        let device = CameraDevice {
            name: caps.card.clone(),
            path: self.device_path.clone(),
            driver: Some(caps.driver.clone()),
        };

        let frames = LatestFrame::new();
        let publisher = frames.clone();
        let path = self.device_path.clone();

        // The stream blocks on hardware, so the loop needs no pacing
        let frame_loop = FrameLoopController::start_with_init(
            "v4l2-camera",
            None,
            move || open_stream(dev, &path),
            move |stream| stream_iteration(stream, &publisher),
        );

        info!(device = %device.name, path = %device.path, "V4L2 camera opened");

        Ok(Box::new(V4l2Handle {
            device,
            frames,
            frame_loop,
        }))
    }
}

/// Open V4L2 camera with its streaming thread
pub struct V4l2Handle {
    device: CameraDevice,
    frames: LatestFrame,
    /// Stopped and joined on drop
    frame_loop: FrameLoopController,
}

impl CameraHandle for V4l2Handle {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        let requested_at = Instant::now();
        if !self.frame_loop.is_running() {
            return Err(BackendError::CaptureFailed(
                "Camera stream stopped".to_string(),
            ));
        }
        self.frames.wait_after(requested_at, timing::FRAME_TIMEOUT)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        self.frames.get()
    }
}

/// Per-thread state of the streaming loop
struct V4l2Stream {
    stream: MmapStream<'static>,
    format: Format,
    mjpeg: bool,
    frame_count: u64,
}

/// Negotiate a format and start streaming
fn open_stream(dev: Device, device_path: &str) -> Result<V4l2Stream, String> {
    let yuyv = FourCC::new(b"YUYV");
    let mjpg = FourCC::new(b"MJPG");

    let mut format = dev
        .format()
        .map_err(|e| format!("Failed to query format: {}", e))?;
    format.width = vc::PATTERN_WIDTH;
    format.height = vc::PATTERN_HEIGHT;
    format.fourcc = yuyv;

    let format = match dev.set_format(&format) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "Could not set YUYV format, using current device format");
            dev.format()
                .map_err(|e| format!("Failed to query format: {}", e))?
        }
    };

    if format.fourcc != yuyv && format.fourcc != mjpg {
        return Err(format!("Unsupported pixel format {}", format.fourcc));
    }

    info!(
        device_path,
        width = format.width,
        height = format.height,
        fourcc = %format.fourcc,
        "V4L2 stream format"
    );

    let mut stream = MmapStream::with_buffers(&dev, Type::VideoCapture, 4)
        .map_err(|e| format!("Failed to create buffer stream: {}", e))?;
    // Bounded dequeue so a stalled device cannot keep the loop from stopping
    stream.set_timeout(timing::STREAM_TIMEOUT);

    Ok(V4l2Stream {
        stream,
        mjpeg: format.fourcc == mjpg,
        format,
        frame_count: 0,
    })
}

/// Dequeue one buffer and publish it as a frame
fn stream_iteration(state: &mut V4l2Stream, frames: &LatestFrame) -> LoopAction {
    let (buf, meta) = match state.stream.next() {
        Ok(next) => next,
        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
            debug!("No V4L2 frame within the stream timeout");
            return LoopAction::Continue;
        }
        Err(e) => {
            warn!(error = %e, "Failed to capture frame");
            std::thread::sleep(timing::FRAME_POLL_INTERVAL);
            return LoopAction::Continue;
        }
    };

    let format = &state.format;
    let frame = if state.mjpeg {
        match image::load_from_memory(buf) {
            Ok(decoded) => {
                let rgb = decoded.to_rgb8();
                let (width, height) = rgb.dimensions();
                CameraFrame::new(width, height, PixelFormat::RGB24, rgb.into_raw())
            }
            Err(e) => {
                debug!(error = %e, "Dropping undecodable MJPEG frame");
                return LoopAction::Continue;
            }
        }
    } else {
        // Kept as YUYV; converted when sampled or encoded
        let len = (format.stride * format.height) as usize;
        let Some(data) = buf.get(..len) else {
            debug!(size = buf.len(), expected = len, "Dropping short YUYV frame");
            return LoopAction::Continue;
        };
        CameraFrame {
            stride: format.stride,
            ..CameraFrame::new(format.width, format.height, PixelFormat::YUYV, data.to_vec())
        }
    };

    frames.publish(frame);

    if state.frame_count % timing::FRAME_LOG_INTERVAL == 0 {
        debug!(
            frame = state.frame_count,
            sequence = meta.sequence,
            size = buf.len(),
            "V4L2 frame captured"
        );
    }
    state.frame_count += 1;

    LoopAction::Continue
}
