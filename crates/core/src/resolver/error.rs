//! Error types for the resolver module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to remote media.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The extractor executable could not be started.
    #[error("yt-dlp not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The thumbnail could not be fetched.
    #[error("Failed to fetch thumbnail {url}: {reason}")]
    ThumbnailFetch { url: String, reason: String },

    /// The extractor failed while downloading.
    #[error("Download failed: {reason}")]
    DownloadFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The extractor reported success but no output file could be found.
    #[error("Downloaded file {filename}.* not found in {directory}")]
    OutputMissing { directory: PathBuf, filename: String },

    /// The destination directory does not exist.
    #[error("Destination directory does not exist: {path}")]
    DestinationMissing { path: PathBuf },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Creates a new download failed error with stderr output.
    pub fn download_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new thumbnail fetch error.
    pub fn thumbnail(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ThumbnailFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
