//! Vibe analysis of captured frames via a hosted vision API.

pub mod client;
pub mod prompts;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use verdict::{AnalysisReport, FrameVerdict, SequenceSummary, VibeVerdict};

use crate::error::{VibeError, VibeResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use client::{Message, MessageContent, VisionClient};
use std::path::{Path, PathBuf};
use tracing::info;

const MAX_TOKENS_SINGLE: u32 = 1024;
const MAX_TOKENS_TEMPORAL: u32 = 2048;

pub struct VibeAnalyzer {
    client: VisionClient,
}

impl VibeAnalyzer {
    /// Build an analyzer; fails fast when no API key was resolved.
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> VibeResult<Self> {
        let api_key = api_key.ok_or(VibeError::MissingApiKey)?;
        Ok(Self {
            client: VisionClient::new(api_key, base_url, model),
        })
    }

    /// Ask for a verdict on a single frame.
    pub async fn analyze_image(&self, path: &Path) -> VibeResult<VibeVerdict> {
        let content = MessageContent::with_images(
            prompts::SINGLE_FRAME_PROMPT.to_string(),
            vec![data_url(path)?],
        );
        let reply = self
            .client
            .chat(vec![Message::user(content)], MAX_TOKENS_SINGLE)
            .await?;
        Ok(verdict::parse_verdict(&reply))
    }

    /// One request per frame, then aggregate. Frames are analyzed in the
    /// order given; the first failure aborts the pass.
    pub async fn analyze_sequence(&self, paths: &[PathBuf]) -> VibeResult<SequenceSummary> {
        let mut frames = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            info!("[Analyzer] [{}/{}] {}", i + 1, paths.len(), path.display());
            let verdict = self.analyze_image(path).await?;
            info!(
                "[Analyzer]   Vibing: {} (confidence {}%)",
                if verdict.is_vibing { "YES" } else { "NO" },
                verdict.confidence
            );
            frames.push(FrameVerdict {
                path: path.clone(),
                verdict,
            });
        }

        SequenceSummary::from_frames(frames)
            .ok_or_else(|| VibeError::Config("No images to analyze".to_string()))
    }

    /// Single request carrying the whole sequence so the model can compare
    /// consecutive frames.
    pub async fn analyze_temporal(&self, paths: &[PathBuf]) -> VibeResult<VibeVerdict> {
        let mut urls = Vec::with_capacity(paths.len());
        for path in paths {
            urls.push(data_url(path)?);
        }
        let content = MessageContent::with_images(prompts::temporal_prompt(paths.len()), urls);
        let reply = self
            .client
            .chat(vec![Message::user(content)], MAX_TOKENS_TEMPORAL)
            .await?;
        Ok(verdict::parse_verdict(&reply))
    }

    /// Mode dispatch: temporal comparison needs at least two frames, anything
    /// less falls back to per-frame analysis.
    pub async fn analyze(&self, paths: &[PathBuf], temporal: bool) -> VibeResult<AnalysisReport> {
        if temporal && paths.len() >= 2 {
            info!(
                "[Analyzer] Temporal comparison across {} frames",
                paths.len()
            );
            Ok(AnalysisReport::Temporal(self.analyze_temporal(paths).await?))
        } else {
            Ok(AnalysisReport::PerFrame(self.analyze_sequence(paths).await?))
        }
    }
}

/// Base64 data URL for a frame on disk, media type chosen by extension.
fn data_url(path: &Path) -> VibeResult<String> {
    let bytes = std::fs::read(path)?;
    let b64 = STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", media_type(path), b64))
}

fn media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}
