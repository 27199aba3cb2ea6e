//! Primary-monitor screenshot source backed by `xcap`.

use super::CaptureSource;
use crate::error::{VibeError, VibeResult};
use image::{ImageFormat, RgbImage};
use xcap::Monitor;

/// Captures the primary monitor, or the first one when none is marked primary.
pub struct ScreenSource {
    monitor: Monitor,
}

impl ScreenSource {
    pub fn primary() -> VibeResult<Self> {
        let monitors = Monitor::all()
            .map_err(|e| VibeError::Device(format!("Failed to enumerate monitors: {}", e)))?;

        let monitor = monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| Monitor::all().ok()?.into_iter().next())
            .ok_or_else(|| VibeError::Device("No monitors found".to_string()))?;

        Ok(Self { monitor })
    }

    /// Pixel size of the monitor this source captures.
    pub fn resolution(&self) -> VibeResult<(u32, u32)> {
        self.monitor
            .width()
            .and_then(|w| self.monitor.height().map(|h| (w, h)))
            .map_err(|e| VibeError::Device(format!("Failed to query monitor size: {}", e)))
    }
}

impl CaptureSource for ScreenSource {
    fn label(&self) -> &'static str {
        "screenshot"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn grab(&mut self) -> VibeResult<RgbImage> {
        let img = self
            .monitor
            .capture_image()
            .map_err(|e| VibeError::Device(format!("Screen capture failed: {}", e)))?;

        let (width, height) = (img.width(), img.height());
        let raw = img.into_raw();
        let rgba = image::RgbaImage::from_raw(width, height, raw).ok_or_else(|| {
            VibeError::Device("Screen capture returned a malformed frame".to_string())
        })?;

        // RGBA → RGB; the on-disk formats don't carry alpha.
        Ok(image::DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}
