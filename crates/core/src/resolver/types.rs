//! Types for the resolver module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Title and thumbnail of a remote video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail_url: String,
}

/// A request to download a remote video into a local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Link to the video page.
    pub link: String,
    /// Directory the file is written to.
    pub destination_directory: PathBuf,
    /// File name without extension, already sanitized.
    pub filename: String,
}

impl DownloadRequest {
    /// Builds a request, falling back to `default_filename` when the user
    /// gave no name (or a blank one) and sanitizing path separators.
    pub fn new(
        link: impl Into<String>,
        destination_directory: impl Into<PathBuf>,
        filename: Option<String>,
        default_filename: &str,
    ) -> Self {
        let filename = filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| default_filename.to_string());

        Self {
            link: link.into().trim().to_string(),
            destination_directory: destination_directory.into(),
            filename: sanitize_filename(&filename),
        }
    }

    /// yt-dlp output template: `<dir>/<filename>.%(ext)s`.
    pub fn output_template(&self) -> PathBuf {
        self.destination_directory
            .join(format!("{}.%(ext)s", self.filename))
    }
}

/// Replaces path separators so the name cannot escape the destination.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Result of a successful download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Task ID the download ran under.
    pub task_id: String,
    /// Final path, including the extension the extractor picked.
    pub output_path: PathBuf,
    /// Size of the downloaded file in bytes.
    pub size_bytes: u64,
    /// Download duration in milliseconds.
    pub duration_ms: u64,
}

impl DownloadResult {
    pub fn file_name(&self) -> Option<&str> {
        self.output_path
            .file_name()
            .and_then(|n| n.to_str())
    }
}
