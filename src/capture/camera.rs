//! Webcam source backed by OpenCV's `VideoCapture`.

use super::CaptureSource;
use crate::error::{VibeError, VibeResult};
use image::{ImageFormat, RgbImage};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use std::time::Duration;

const WARMUP: Duration = Duration::from_millis(500);

/// Holds the device open for the whole session; released on drop.
pub struct CameraSource {
    cam: VideoCapture,
    index: i32,
}

impl CameraSource {
    /// Open camera `index`, request 1280x720, and give the sensor a moment
    /// to adjust exposure before the first frame.
    pub fn open(index: i32) -> VibeResult<Self> {
        let mut cam = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| VibeError::Device(format!("Failed to open camera {}: {}", index, e)))?;

        let opened = cam
            .is_opened()
            .map_err(|e| VibeError::Device(format!("Camera {} state unknown: {}", index, e)))?;
        if !opened {
            return Err(VibeError::Device(format!("Could not open camera {}", index)));
        }

        // Resolution hints; drivers fall back to the nearest supported mode.
        let _ = cam.set(videoio::CAP_PROP_FRAME_WIDTH, 1280.0);
        let _ = cam.set(videoio::CAP_PROP_FRAME_HEIGHT, 720.0);

        std::thread::sleep(WARMUP);

        Ok(Self { cam, index })
    }
}

impl CaptureSource for CameraSource {
    fn label(&self) -> &'static str {
        "camera"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn grab(&mut self) -> VibeResult<RgbImage> {
        let mut frame = Mat::default();
        let got = self
            .cam
            .read(&mut frame)
            .map_err(|e| VibeError::Device(format!("Camera {} read failed: {}", self.index, e)))?;
        if !got || frame.empty() {
            return Err(VibeError::Device(format!(
                "Failed to capture image from camera {}",
                self.index
            )));
        }
        bgr_to_rgb(&frame)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        let _ = self.cam.release();
    }
}

/// `VideoCapture` hands out 8-bit BGR mats; swap to RGB for the image crate.
fn bgr_to_rgb(frame: &Mat) -> VibeResult<RgbImage> {
    if frame.channels() != 3 {
        return Err(VibeError::Device(format!(
            "Unsupported camera pixel format ({} channels)",
            frame.channels()
        )));
    }

    let (width, height) = (frame.cols() as u32, frame.rows() as u32);
    let data = frame
        .data_bytes()
        .map_err(|e| VibeError::Device(format!("Camera frame not readable: {}", e)))?;

    let mut rgb = Vec::with_capacity(data.len());
    for px in data.chunks_exact(3) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| VibeError::Device("Camera returned a malformed frame".to_string()))
}
