//! Timed capture sessions that write numbered, timestamped frames to disk.

use crate::capture::{self, CaptureSource};
use crate::error::{VibeError, VibeResult};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Parameters for one capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub output_dir: PathBuf,
    pub duration: Duration,
    pub interval: Duration,
}

impl SessionConfig {
    pub fn new(output_dir: impl Into<PathBuf>, duration: Duration, interval: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            duration,
            interval,
        }
    }

    /// A zero interval would spin the loop forever.
    pub fn validate(&self) -> VibeResult<()> {
        if self.interval.is_zero() {
            return Err(VibeError::Config(
                "Capture interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Lower bound on frames for a session that keeps pace.
    pub fn expected_captures(&self) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }
        (self.duration.as_secs_f64() / self.interval.as_secs_f64()) as u64
    }
}

/// Run a capture session: one frame at t = 0, then one at every interval
/// tick that lands before the duration elapses. Returns the written paths
/// in capture order. The first failed grab or write aborts the session.
pub async fn record(
    source: &mut dyn CaptureSource,
    config: &SessionConfig,
) -> VibeResult<Vec<PathBuf>> {
    config.validate()?;

    if !config.output_dir.exists() {
        std::fs::create_dir_all(&config.output_dir)?;
        info!(
            "[Recorder] Created output directory: {}",
            config.output_dir.display()
        );
    } else {
        info!(
            "[Recorder] Using existing output directory: {}",
            config.output_dir.display()
        );
    }

    info!(
        "[Recorder] Starting {} capture: {:.1}s at {:.1}s intervals into {}",
        source.label(),
        config.duration.as_secs_f64(),
        config.interval.as_secs_f64(),
        config.output_dir.display()
    );

    let start = tokio::time::Instant::now();
    let mut captured: Vec<PathBuf> = Vec::new();

    while start.elapsed() < config.duration {
        let frame = source.grab()?;
        let filename = format!(
            "{}_{:03}_{}.{}",
            source.label(),
            captured.len() + 1,
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            capture::extension(source.format())
        );
        let path = config.output_dir.join(filename);
        write_frame(&frame, &path, source.format())?;

        info!(
            "[Recorder] [{:.1}s] Captured {}",
            start.elapsed().as_secs_f64(),
            path.display()
        );
        captured.push(path);

        // Pace against the session start so slow grabs don't accumulate drift.
        let next = start + config.interval * captured.len() as u32;
        tokio::time::sleep_until(next).await;
    }

    info!("[Recorder] Session complete: {} frames", captured.len());
    Ok(captured)
}

fn write_frame(frame: &image::RgbImage, path: &Path, format: image::ImageFormat) -> VibeResult<()> {
    let mut buf = Cursor::new(Vec::new());
    frame.write_to(&mut buf, format)?;
    std::fs::write(path, buf.into_inner())?;
    Ok(())
}
