//! Error taxonomy for capture sessions and vision-API analysis.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VibeError {
    /// A capture device (monitor, webcam) could not be opened or read.
    #[error("Capture device unavailable: {0}")]
    Device(String),

    /// Frame could not be encoded into the target image format.
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No API key was supplied via flag, config file, or environment.
    #[error("No API key configured")]
    MissingApiKey,

    /// The vision API rejected the credentials (401/403).
    #[error("Vision API authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The vision API throttled the request (429).
    #[error("Vision API rate limited: {message}")]
    RateLimit { message: String },

    /// Any other non-success status from the vision API.
    #[error("Vision API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure talking to the vision API.
    #[error("Vision API request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered 200 but the completion content was empty or missing.
    #[error("Malformed analysis reply: {0}")]
    MalformedReply(String),
}

pub type VibeResult<T> = std::result::Result<T, VibeError>;
