//! Configuration for the resolver module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the yt-dlp based resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Path to the yt-dlp executable.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// yt-dlp format selector used for downloads.
    #[serde(default = "default_format")]
    pub format: String,

    /// Socket timeout handed to yt-dlp, in seconds.
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_secs: u32,

    /// Timeout for thumbnail requests, in seconds.
    #[serde(default = "default_thumbnail_timeout")]
    pub thumbnail_timeout_secs: u64,

    /// File name used when the user does not provide one.
    #[serde(default = "default_filename")]
    pub default_filename: String,

    /// Additional yt-dlp arguments for downloads.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Looks for yt-dlp in the usual install locations, falling back to PATH.
fn default_ytdlp_path() -> PathBuf {
    const COMMON_PATHS: [&str; 3] = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac, pip --user installs
        "/usr/bin/yt-dlp",          // System package
    ];

    COMMON_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("yt-dlp"))
}

fn default_format() -> String {
    "best".to_string()
}

fn default_socket_timeout() -> u32 {
    15
}

fn default_thumbnail_timeout() -> u64 {
    30
}

fn default_filename() -> String {
    "video".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            format: default_format(),
            socket_timeout_secs: default_socket_timeout(),
            thumbnail_timeout_secs: default_thumbnail_timeout(),
            default_filename: default_filename(),
            extra_args: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Creates a config pointing at a specific yt-dlp executable.
    pub fn with_ytdlp_path(ytdlp_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            ..Default::default()
        }
    }
}
