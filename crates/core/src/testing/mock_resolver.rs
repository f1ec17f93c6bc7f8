//! Mock media resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::progress::{new_task_id, TaskProgress};
use crate::resolver::{
    reset_timestamps, DownloadRequest, DownloadResult, MediaResolver, ResolverError, VideoMetadata,
};

/// Mock implementation of the MediaResolver trait.
///
/// Links resolve only after [`add_video`](Self::add_video); thumbnails are
/// served only after [`set_thumbnail`](Self::set_thumbnail). Downloads write
/// a small file named `<filename>.<extension>` into the requested directory.
///
/// # Example
///
/// ```rust,ignore
/// use filetools_core::testing::MockResolver;
///
/// let resolver = MockResolver::new();
/// resolver.add_video("https://v.example/1", "A talk", "https://img.example/1.jpg").await;
///
/// let meta = resolver.resolve_metadata("https://v.example/1").await;
/// assert!(meta.is_some());
/// ```
#[derive(Debug)]
pub struct MockResolver {
    videos: Arc<RwLock<HashMap<String, VideoMetadata>>>,
    thumbnails: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    resolved: Arc<RwLock<Vec<String>>>,
    downloads: Arc<RwLock<Vec<DownloadRequest>>>,
    /// If set, the next download will fail with this error.
    next_error: Arc<RwLock<Option<ResolverError>>>,
    /// Simulated download duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    /// Extension the "extractor" picks.
    extension: Arc<RwLock<String>>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            videos: Arc::new(RwLock::new(HashMap::new())),
            thumbnails: Arc::new(RwLock::new(HashMap::new())),
            resolved: Arc::new(RwLock::new(Vec::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
            extension: Arc::new(RwLock::new("mp4".to_string())),
        }
    }

    /// Make `link` resolvable.
    pub async fn add_video(&self, link: &str, title: &str, thumbnail_url: &str) {
        self.videos.write().await.insert(
            link.to_string(),
            VideoMetadata {
                title: title.to_string(),
                thumbnail_url: thumbnail_url.to_string(),
            },
        );
    }

    /// Serve `bytes` for `url`.
    pub async fn set_thumbnail(&self, url: &str, bytes: Vec<u8>) {
        self.thumbnails.write().await.insert(url.to_string(), bytes);
    }

    /// Links passed to `resolve_metadata`, in call order.
    pub async fn resolved_links(&self) -> Vec<String> {
        self.resolved.read().await.clone()
    }

    /// Get all recorded download requests.
    pub async fn recorded_downloads(&self) -> Vec<DownloadRequest> {
        self.downloads.read().await.clone()
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_error(&self, error: ResolverError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated download duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    pub async fn set_extension(&self, extension: &str) {
        *self.extension.write().await = extension.to_string();
    }

    async fn run_download(
        &self,
        request: &DownloadRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<DownloadResult, ResolverError> {
        self.downloads.write().await.push(request.clone());
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if !request.destination_directory.is_dir() {
            return Err(ResolverError::DestinationMissing {
                path: request.destination_directory.clone(),
            });
        }

        let task_id = new_task_id();
        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            let steps = 4;
            for i in 0..steps {
                tokio::time::sleep(Duration::from_millis(duration_ms / steps)).await;
                if let Some(tx) = &progress_tx {
                    let percent = ((i + 1) as f32 / steps as f32) * 100.0;
                    let _ = tx
                        .send(TaskProgress::new(task_id.as_str(), percent, "Downloading"))
                        .await;
                }
            }
        }

        let extension = self.extension.read().await.clone();
        let output_path = request
            .destination_directory
            .join(format!("{}.{}", request.filename, extension));
        tokio::fs::write(&output_path, b"mock video").await?;
        reset_timestamps(&output_path).await?;

        Ok(DownloadResult {
            task_id,
            output_path,
            size_bytes: 10,
            duration_ms,
        })
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve_metadata(&self, link: &str) -> Option<VideoMetadata> {
        self.resolved.write().await.push(link.to_string());
        self.videos.read().await.get(link).cloned()
    }

    async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<Vec<u8>, ResolverError> {
        self.thumbnails
            .read()
            .await
            .get(thumbnail_url)
            .cloned()
            .ok_or_else(|| ResolverError::thumbnail(thumbnail_url, "HTTP 404 Not Found"))
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
