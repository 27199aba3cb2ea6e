//! Interval capture of desktop/webcam frames plus vision-API vibe analysis.

pub mod analyzer;
pub mod capture;
pub mod config;
pub mod error;
pub mod recorder;

pub use error::{VibeError, VibeResult};
