//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::converter::{
    video_output_path, MediaInfo, TranscodeError, TranscodeResult, Transcoder,
};
use crate::progress::{new_task_id, TaskProgress};

/// A recorded transcode call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    pub source: PathBuf,
    pub target_extension: String,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track transcode calls for assertions
/// - Simulate failure through error injection
/// - Simulate long-running work with progress updates
///
/// # Example
///
/// ```rust,ignore
/// use filetools_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new();
/// transcoder.set_duration(Duration::from_secs(5)).await;
///
/// let result = transcoder.transcode(Path::new("/v/clip.mov"), "mp4").await?;
///
/// let calls = transcoder.recorded_calls().await;
/// assert_eq!(calls.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    calls: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    /// Simulated transcode duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder that finishes immediately.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Get all recorded transcode calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedTranscode> {
        self.calls.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated transcode duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    async fn take_error(&self) -> Option<TranscodeError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, source: &Path, target_extension: &str, success: bool) {
        self.calls.write().await.push(RecordedTranscode {
            source: source.to_path_buf(),
            target_extension: target_extension.to_string(),
            success,
        });
    }

    async fn run(
        &self,
        source: &Path,
        target_extension: &str,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<TranscodeResult, TranscodeError> {
        if let Some(err) = self.take_error().await {
            self.record(source, target_extension, false).await;
            return Err(err);
        }
        self.record(source, target_extension, true).await;

        let task_id = new_task_id();
        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            let steps = 5;
            for i in 0..steps {
                tokio::time::sleep(Duration::from_millis(duration_ms / steps)).await;
                if let Some(tx) = &progress_tx {
                    let percent = ((i + 1) as f32 / steps as f32) * 100.0;
                    let _ = tx
                        .send(TaskProgress::new(task_id.as_str(), percent, "Transcoding"))
                        .await;
                }
            }
        }

        let output_path = video_output_path(source, target_extension);
        // Only materialize output next to real files
        if source.exists() {
            tokio::fs::write(&output_path, b"mock transcode").await?;
        }

        Ok(TranscodeResult {
            task_id,
            output_path,
            output_size_bytes: 14,
            duration_ms,
        })
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 100 * 1024 * 1024, // 100 MB
            duration_secs: 120.0,
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
            video_codec: Some("h264".to_string()),
            audio_codec: Some("aac".to_string()),
        })
    }

    async fn transcode(
        &self,
        source: &Path,
        target_extension: &str,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.run(source, target_extension, None).await
    }

    async fn transcode_with_progress(
        &self,
        source: &Path,
        target_extension: &str,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.run(source, target_extension, Some(progress_tx)).await
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_transcode() {
        let transcoder = MockTranscoder::new();

        let result = transcoder
            .transcode(Path::new("/v/clip.mov"), "mp4")
            .await
            .unwrap();

        assert_eq!(result.output_path, PathBuf::from("/v/clip.mp4"));
        let calls = transcoder.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert!(calls[0].success);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let transcoder = MockTranscoder::new();
        transcoder
            .set_next_error(TranscodeError::failed("test error", None))
            .await;

        let result = transcoder.transcode(Path::new("/v/clip.mov"), "mp4").await;
        assert!(result.is_err());

        // Error should be consumed, call recorded as failed
        let calls = transcoder.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].success);
        assert!(transcoder.transcode(Path::new("/v/clip.mov"), "mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_progress_updates() {
        let transcoder = MockTranscoder::new();
        transcoder.set_duration(Duration::from_millis(50)).await;

        let (tx, mut rx) = mpsc::channel(10);
        tokio::spawn(async move {
            transcoder
                .transcode_with_progress(Path::new("/v/clip.avi"), "mkv", tx)
                .await
                .unwrap();
        });

        let mut progress_count = 0;
        while rx.recv().await.is_some() {
            progress_count += 1;
        }

        assert_eq!(progress_count, 5);
    }
}
