//! Frame sources for capture sessions.

pub mod pattern;
pub mod screen;

#[cfg(feature = "camera")]
pub mod camera;

pub use pattern::PatternSource;
pub use screen::ScreenSource;

#[cfg(feature = "camera")]
pub use camera::CameraSource;

use crate::error::VibeResult;
use image::{ImageFormat, RgbImage};
use std::path::PathBuf;

/// A device that produces one RGB frame at a time.
pub trait CaptureSource {
    /// Filename prefix for frames from this source.
    fn label(&self) -> &'static str;

    /// On-disk encoding for frames from this source.
    fn format(&self) -> ImageFormat;

    /// Capture a single frame.
    fn grab(&mut self) -> VibeResult<RgbImage>;
}

/// File extension matching a source's `format()`.
pub fn extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        _ => "jpg",
    }
}

/// Video device nodes visible to the OS (`/dev/video*`).
#[cfg(target_os = "linux")]
pub fn list_video_devices() -> Vec<PathBuf> {
    let mut devices: Vec<PathBuf> = match std::fs::read_dir("/dev") {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with("video"))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    devices.sort();
    devices
}

#[cfg(not(target_os = "linux"))]
pub fn list_video_devices() -> Vec<PathBuf> {
    Vec::new()
}
