//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::ConverterConfig;
use super::error::TranscodeError;
use super::output::{resolve_output_path, video_output_path};
use super::traits::Transcoder;
use super::types::{MediaInfo, TranscodeResult};
use crate::progress::{new_task_id, TaskProgress};

static OUT_TIME_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"out_time_(?:ms|us)=(\d+)").ok());
static SPEED_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"speed=\s*(\d+\.?\d*)x").ok());
static PROGRESS_KEY_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*=").ok());

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: ConverterConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Builds ffmpeg arguments for the fixed encoding profile.
    fn build_args(&self, input_path: &Path, output_path: &Path) -> Vec<String> {
        let profile = self.config.profile();
        let mut args = vec![
            "-y".to_string(), // Collisions are resolved before ffmpeg runs
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-c:v".to_string(),
            profile.video_codec,
            "-c:a".to_string(),
            profile.audio_codec,
        ];

        // Log level and progress
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
            "-nostats".to_string(),
        ]);

        // Extra args
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, TranscodeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            TranscodeError::probe_failed(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let codec_of = |kind: &str| {
            probe
                .streams
                .iter()
                .find(|s| s.codec_type == kind)
                .and_then(|s| s.codec_name.clone())
        };

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: probe
                .format
                .size
                .as_ref()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0),
            duration_secs: probe
                .format
                .duration
                .as_ref()
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0),
            format: probe
                .format
                .format_name
                .split(',')
                .next()
                .unwrap_or("unknown")
                .to_string(),
            video_codec: codec_of("video"),
            audio_codec: codec_of("audio"),
        })
    }

    /// `-progress` writes bare `key=value` lines; diagnostics never start that way.
    fn is_progress_line(line: &str) -> bool {
        PROGRESS_KEY_RE
            .as_ref()
            .is_some_and(|re| re.is_match(line))
    }

    /// Converts a progress line into (seconds processed, speed).
    fn parse_progress_line(line: &str) -> (Option<f64>, Option<String>) {
        let time = OUT_TIME_RE
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|us| us / 1_000_000.0);
        let speed = SPEED_RE
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| format!("{}x", m.as_str()));
        (time, speed)
    }

    fn output_path_for(&self, source: &Path, target_extension: &str) -> Result<PathBuf, TranscodeError> {
        let derived = video_output_path(source, target_extension);
        resolve_output_path(derived.clone(), self.config.collision_policy)
            .ok_or(TranscodeError::OutputExists { path: derived })
    }

    /// Runs the transcode with optional progress reporting.
    async fn run_transcode(
        &self,
        source: &Path,
        target_extension: &str,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<TranscodeResult, TranscodeError> {
        let start = Instant::now();
        let task_id = new_task_id();

        if !source.exists() {
            return Err(TranscodeError::InputNotFound {
                path: source.to_path_buf(),
            });
        }
        let output_path = self.output_path_for(source, target_extension)?;

        // Get input duration for progress calculation
        let duration_secs = match self.probe(source).await {
            Ok(info) => Some(info.duration_secs).filter(|d| *d > 0.0),
            Err(e) => {
                warn!("Could not probe {:?}, progress unavailable: {}", source, e);
                None
            }
        };

        let args = self.build_args(source, &output_path);
        info!("Transcoding {:?} -> {:?}", source, output_path);
        debug!("ffmpeg {}", args.join(" "));

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscodeError::failed("ffmpeg stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut last_progress_send = Instant::now();
            let progress_interval = Duration::from_millis(500);
            let mut error_output = String::new();
            let mut current_time = 0.0;
            let mut current_speed: Option<String> = None;

            while let Ok(Some(line)) = reader.next_line().await {
                if !Self::is_progress_line(&line) {
                    error_output.push_str(&line);
                    error_output.push('\n');
                    continue;
                }

                let (time, speed) = Self::parse_progress_line(&line);
                if let Some(t) = time {
                    current_time = t;
                }
                if speed.is_some() {
                    current_speed = speed;
                }

                if let Some(ref tx) = progress_tx {
                    if last_progress_send.elapsed() >= progress_interval {
                        let percent = duration_secs
                            .map(|dur| (current_time / dur * 100.0).min(100.0) as f32)
                            .unwrap_or(0.0);
                        let status = match &current_speed {
                            Some(speed) => format!("Transcoding {:.1}% @ {}", percent, speed),
                            None => format!("Transcoding {:.1}%", percent),
                        };

                        // Non-blocking send
                        let _ = tx.try_send(TaskProgress::new(task_id.clone(), percent, status));
                        last_progress_send = Instant::now();
                    }
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(TranscodeError::failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Ok(Err(e)) => return Err(TranscodeError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(TranscodeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        let output_meta = tokio::fs::metadata(&output_path)
            .await
            .map_err(|_| TranscodeError::failed("Output file not created", None))?;

        if let Some(tx) = progress_tx {
            let _ = tx.try_send(TaskProgress::new(task_id.clone(), 100.0, "Transcode finished"));
        }

        Ok(TranscodeResult {
            task_id,
            output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        if !path.exists() {
            return Err(TranscodeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(TranscodeError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn transcode(
        &self,
        source: &Path,
        target_extension: &str,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.run_transcode(source, target_extension, None).await
    }

    async fn transcode_with_progress(
        &self,
        source: &Path,
        target_extension: &str,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.run_transcode(source, target_extension, Some(progress_tx))
            .await
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        let checks = [
            (&self.config.ffmpeg_path, true),
            (&self.config.ffprobe_path, false),
        ];

        for (path, is_ffmpeg) in checks {
            if let Err(e) = Command::new(path).arg("-version").output().await {
                if e.kind() == std::io::ErrorKind::NotFound {
                    let path = path.clone();
                    return Err(if is_ffmpeg {
                        TranscodeError::FfmpegNotFound { path }
                    } else {
                        TranscodeError::FfprobeNotFound { path }
                    });
                }
                return Err(TranscodeError::Io(e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::CollisionPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_build_args_uses_fixed_profile() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let args = transcoder.build_args(Path::new("/in/clip.mov"), Path::new("/in/clip.mp4"));

        assert_eq!(args[0], "-y");
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(args.windows(2).any(|w| w == ["-progress", "pipe:2"]));
        assert_eq!(args.last().unwrap(), "/in/clip.mp4");
    }

    #[test]
    fn test_build_args_appends_extra_args_before_output() {
        let mut config = ConverterConfig::default();
        config.extra_ffmpeg_args = vec!["-threads".to_string(), "2".to_string()];
        let transcoder = FfmpegTranscoder::new(config);

        let args = transcoder.build_args(Path::new("a.avi"), Path::new("a.mkv"));
        let n = args.len();
        assert_eq!(&args[n - 3..], ["-threads", "2", "a.mkv"]);
    }

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(
            FfmpegTranscoder::parse_progress_line("out_time_ms=2500000"),
            (Some(2.5), None)
        );
        assert_eq!(
            FfmpegTranscoder::parse_progress_line("speed=1.25x"),
            (None, Some("1.25x".to_string()))
        );
        assert_eq!(FfmpegTranscoder::parse_progress_line("frame=12"), (None, None));
    }

    #[test]
    fn test_progress_lines_are_told_apart_from_diagnostics() {
        for line in ["frame=42", "out_time_us=1500000", "stream_0_0_q=28.0", "progress=end"] {
            assert!(FfmpegTranscoder::is_progress_line(line), "{}", line);
        }
        for line in [
            "[libx264 @ 0x55d] bit_rate=0 is not supported",
            "Error while opening encoder for output stream #0:0",
            "clip.mov: Invalid data found when processing input",
            "  bit_rate=128000",
        ] {
            assert!(!FfmpegTranscoder::is_progress_line(line), "{}", line);
        }
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "format": {
                "filename": "clip.mov",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "12.5",
                "size": "3000000"
            },
            "streams": [
                { "codec_type": "video", "codec_name": "h264" },
                { "codec_type": "audio", "codec_name": "aac" }
            ]
        }"#;

        let info = FfmpegTranscoder::parse_probe_output(Path::new("clip.mov"), json).unwrap();
        assert_eq!(info.format, "mov");
        assert!((info.duration_secs - 12.5).abs() < 0.01);
        assert_eq!(info.size_bytes, 3_000_000);
        assert_eq!(info.video_codec, Some("h264".to_string()));
        assert_eq!(info.audio_codec, Some("aac".to_string()));
    }

    #[test]
    fn test_parse_probe_output_invalid() {
        let result = FfmpegTranscoder::parse_probe_output(Path::new("x.mov"), "not json");
        assert!(matches!(result, Err(TranscodeError::ProbeFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let result = transcoder
            .transcode(Path::new("/definitely/not/here.mov"), "mp4")
            .await;
        assert!(matches!(result, Err(TranscodeError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_fail_policy_rejects_existing_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("clip.mov");
        std::fs::write(&source, b"mov").unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"mp4").unwrap();

        let transcoder = FfmpegTranscoder::new(
            ConverterConfig::default().with_collision_policy(CollisionPolicy::Fail),
        );
        let result = transcoder.transcode(&source, "mp4").await;
        assert!(matches!(result, Err(TranscodeError::OutputExists { .. })));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_binary() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("clip.avi");
        std::fs::write(&source, b"avi").unwrap();

        let transcoder = FfmpegTranscoder::new(ConverterConfig::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        ));
        let result = transcoder.transcode(&source, "mkv").await;
        assert!(matches!(result, Err(TranscodeError::FfmpegNotFound { .. })));

        let validation = transcoder.validate().await;
        assert!(matches!(validation, Err(TranscodeError::FfmpegNotFound { .. })));
    }
}
