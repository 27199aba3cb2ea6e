//! Synthetic gradient frames for exercising the pipeline without hardware.

use super::CaptureSource;
use crate::error::VibeResult;
use image::{ImageFormat, Rgb, RgbImage};

pub const PATTERN_WIDTH: u32 = 640;
pub const PATTERN_HEIGHT: u32 = 480;

/// Produces a vertical color gradient instead of reading a device.
pub struct PatternSource {
    width: u32,
    height: u32,
}

impl PatternSource {
    pub fn new() -> Self {
        Self {
            width: PATTERN_WIDTH,
            height: PATTERN_HEIGHT,
        }
    }
}

impl Default for PatternSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for PatternSource {
    fn label(&self) -> &'static str {
        "pattern"
    }

    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn grab(&mut self) -> VibeResult<RgbImage> {
        let height = self.height.max(1);
        Ok(RgbImage::from_fn(self.width, self.height, |_, y| {
            let v = (y * 255 / height) as u8;
            Rgb([255 - v, 128, v])
        }))
    }
}
