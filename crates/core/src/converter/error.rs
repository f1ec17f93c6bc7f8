//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting an image.
#[derive(Debug, Error)]
pub enum ImageConvertError {
    /// Source file did not exist when it was opened.
    #[error("The file {path} was not found")]
    SourceNotFound { path: PathBuf },

    /// Source could not be decoded or the target format could not be written.
    #[error("Cannot convert or save the image: {reason}")]
    Encode { reason: String },

    /// Output file exists and the collision policy forbids replacing it.
    #[error("Output file already exists: {path}")]
    OutputExists { path: PathBuf },

    /// Anything else.
    #[error("An unexpected error occurred: {reason}")]
    Unexpected { reason: String },
}

impl ImageConvertError {
    /// Creates a new encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Creates a new unexpected error.
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while transcoding a video.
///
/// Callers outside this module treat every variant as a single
/// "transcode failed" condition; the variants only sharpen log output.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Output file exists and the collision policy forbids replacing it.
    #[error("Output file already exists: {path}")]
    OutputExists { path: PathBuf },

    /// The encoder exited unsuccessfully.
    #[error("Transcode failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Transcode timed out.
    #[error("Transcode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// I/O error during transcoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a new failed error with stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }
}
