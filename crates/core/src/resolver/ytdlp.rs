//! yt-dlp based resolver implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::ResolverConfig;
use super::error::ResolverError;
use super::timestamps::reset_timestamps;
use super::traits::MediaResolver;
use super::types::{DownloadRequest, DownloadResult, VideoMetadata};
use crate::progress::{new_task_id, TaskProgress};

static DOWNLOAD_PERCENT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%").ok());
static DOWNLOAD_DETAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"of\s+~?\s*(\S+)(?:\s+at\s+(\S+))?").ok());

/// Subset of the `--dump-json` document we care about.
#[derive(Debug, Deserialize)]
struct ExtractorInfo {
    title: Option<String>,
    thumbnail: Option<String>,
}

/// Resolver backed by the yt-dlp command line tool.
pub struct YtDlpResolver {
    config: ResolverConfig,
    http: Client,
}

impl YtDlpResolver {
    /// Creates a new resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.thumbnail_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { config, http }
    }

    /// Creates a resolver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ResolverConfig::default())
    }

    fn metadata_args(&self, link: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.config.socket_timeout_secs.to_string(),
            // Links are never interpreted as options
            "--".to_string(),
            link.to_string(),
        ]
    }

    fn download_args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.config.format.clone(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.config.socket_timeout_secs.to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "-o".to_string(),
            request.output_template().to_string_lossy().to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(request.link.clone());
        args
    }

    /// Extracts title and thumbnail from a `--dump-json` document.
    fn parse_info(json: &str) -> Option<VideoMetadata> {
        let info: ExtractorInfo = match serde_json::from_str(json) {
            Ok(info) => info,
            Err(e) => {
                warn!("Malformed extractor response: {}", e);
                return None;
            }
        };

        let non_empty = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (non_empty(info.title), non_empty(info.thumbnail)) {
            (Some(title), Some(thumbnail_url)) => Some(VideoMetadata {
                title,
                thumbnail_url,
            }),
            (title, thumbnail) => {
                warn!(
                    has_title = title.is_some(),
                    has_thumbnail = thumbnail.is_some(),
                    "Extractor response is missing required fields"
                );
                None
            }
        }
    }

    /// Parses a `[download]  42.3% of 10.00MiB at 1.2MiB/s ETA 00:05` line.
    fn parse_progress_line(line: &str) -> Option<(f32, String)> {
        let percent = DOWNLOAD_PERCENT_RE
            .as_ref()
            .and_then(|re| re.captures(line.trim_start()))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f32>().ok())?;

        let detail = DOWNLOAD_DETAIL_RE.as_ref().and_then(|re| re.captures(line));
        let size = detail.as_ref().and_then(|c| c.get(1)).map(|m| m.as_str());
        let speed = detail.as_ref().and_then(|c| c.get(2)).map(|m| m.as_str());

        let status = match (size, speed) {
            (Some(size), Some(speed)) => format!("Downloading {:.1}% of {} @ {}", percent, size, speed),
            (Some(size), None) => format!("Downloading {:.1}% of {}", percent, size),
            _ => format!("Downloading {:.1}%", percent),
        };
        Some((percent, status))
    }

    /// Locates the downloaded file.
    ///
    /// Prefers the path yt-dlp printed after moving the file, then falls back
    /// to the newest `<filename>.*` in the destination directory.
    async fn locate_output(
        request: &DownloadRequest,
        printed: &[String],
    ) -> Result<PathBuf, ResolverError> {
        for line in printed.iter().rev() {
            let candidate = PathBuf::from(line.trim());
            if candidate.is_absolute() && tokio::fs::metadata(&candidate).await.is_ok() {
                return Ok(candidate);
            }
        }

        let prefix = format!("{}.", request.filename);
        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        let mut entries = tokio::fs::read_dir(&request.destination_directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Skip yt-dlp's partial files
            if !name.starts_with(&prefix) || name.ends_with(".part") || name.ends_with(".ytdl") {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified()?;
            if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
                newest = Some((modified, entry.path()));
            }
        }

        newest
            .map(|(_, path)| path)
            .ok_or_else(|| ResolverError::OutputMissing {
                directory: request.destination_directory.clone(),
                filename: request.filename.clone(),
            })
    }

    /// Runs the download with optional progress reporting.
    async fn run_download(
        &self,
        request: &DownloadRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<DownloadResult, ResolverError> {
        let start = Instant::now();
        let task_id = new_task_id();

        if !request.destination_directory.is_dir() {
            return Err(ResolverError::DestinationMissing {
                path: request.destination_directory.clone(),
            });
        }

        let args = self.download_args(request);
        info!(
            task_id = %task_id,
            "Downloading {} -> {:?}",
            request.link,
            request.output_template()
        );
        debug!("yt-dlp {}", args.join(" "));

        let mut child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ResolverError::download_failed("yt-dlp stdout was not captured", None))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ResolverError::download_failed("yt-dlp stderr was not captured", None))?;

        let (stdout_lines, stderr_lines) = tokio::join!(
            collect_output(stdout, &task_id, progress_tx.as_ref()),
            collect_output(stderr, &task_id, progress_tx.as_ref()),
        );
        let status = child.wait().await?;

        if !status.success() {
            let stderr = stderr_lines.join("\n");
            return Err(ResolverError::download_failed(
                format!("yt-dlp exited with code: {:?}", status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        let output_path = Self::locate_output(request, &stdout_lines).await?;
        reset_timestamps(&output_path).await?;
        let size_bytes = tokio::fs::metadata(&output_path).await?.len();

        if let Some(tx) = progress_tx {
            let _ = tx.try_send(TaskProgress::new(task_id.clone(), 100.0, "Download finished"));
        }
        info!(task_id = %task_id, "Downloaded {:?} ({} bytes)", output_path, size_bytes);

        Ok(DownloadResult {
            task_id,
            output_path,
            size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn spawn_error(&self, e: std::io::Error) -> ResolverError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ResolverError::ToolNotFound {
                path: self.config.ytdlp_path.clone(),
            }
        } else {
            ResolverError::Io(e)
        }
    }
}

/// Drains a child stream, forwarding progress lines and returning the rest.
async fn collect_output<R>(
    stream: R,
    task_id: &str,
    progress_tx: Option<&mpsc::Sender<TaskProgress>>,
) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut kept = Vec::new();
    let mut last_send: Option<Instant> = None;
    let interval = Duration::from_millis(250);

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some((percent, status)) = YtDlpResolver::parse_progress_line(&line) {
            if let Some(tx) = progress_tx {
                if last_send.is_none_or(|t| t.elapsed() >= interval) {
                    // Non-blocking send
                    let _ = tx.try_send(TaskProgress::new(task_id, percent, status));
                    last_send = Some(Instant::now());
                }
            }
            continue;
        }
        if !line.trim().is_empty() {
            kept.push(line);
        }
    }

    kept
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn resolve_metadata(&self, link: &str) -> Option<VideoMetadata> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        let output = match Command::new(&self.config.ytdlp_path)
            .args(self.metadata_args(link))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Could not run {:?}: {}", self.config.ytdlp_path, e);
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "Could not resolve {}: {}",
                link,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // --dump-json prints one document per line; the first one is the video
        let first = stdout.lines().find(|l| !l.trim().is_empty())?;
        Self::parse_info(first)
    }

    async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<Vec<u8>, ResolverError> {
        debug!("Fetching thumbnail {}", thumbnail_url);

        let response = self
            .http
            .get(thumbnail_url)
            .send()
            .await
            .map_err(|e| ResolverError::thumbnail(thumbnail_url, e))?;

        if !response.status().is_success() {
            return Err(ResolverError::thumbnail(
                thumbnail_url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolverError::thumbnail(thumbnail_url, e))?;
        Ok(bytes.to_vec())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadResult, ResolverError> {
        self.run_download(request, None).await
    }

    async fn download_with_progress(
        &self,
        request: &DownloadRequest,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> Result<DownloadResult, ResolverError> {
        self.run_download(request, Some(progress_tx)).await
    }
}
