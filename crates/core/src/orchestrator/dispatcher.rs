//! Routes confirmed requests to converters and the resolver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::converter::{FfmpegTranscoder, ImageConverter, Transcoder};
use crate::formats::{self, Category};
use crate::progress::{new_task_id, TaskProgress};
use crate::resolver::{DownloadRequest, MediaResolver, VideoMetadata, YtDlpResolver};

use super::types::{ConversionRequest, OperationOutcome, SourceFile, TaskError, Thumbnail};

/// Picks the operation for a request and reports its outcome.
pub struct TaskOrchestrator {
    images: ImageConverter,
    transcoder: Arc<dyn Transcoder>,
    resolver: Arc<dyn MediaResolver>,
    default_filename: String,
}

impl TaskOrchestrator {
    pub fn new(
        images: ImageConverter,
        transcoder: Arc<dyn Transcoder>,
        resolver: Arc<dyn MediaResolver>,
    ) -> Self {
        Self {
            images,
            transcoder,
            resolver,
            default_filename: "video".to_string(),
        }
    }

    /// Builds the orchestrator with the ffmpeg and yt-dlp backends.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ImageConverter::new(config.converter.collision_policy),
            Arc::new(FfmpegTranscoder::new(config.converter.clone())),
            Arc::new(YtDlpResolver::new(config.resolver.clone())),
        )
        .with_default_filename(&config.resolver.default_filename)
    }

    /// Sets the file name used when the user does not name a download.
    pub fn with_default_filename(mut self, name: &str) -> Self {
        self.default_filename = name.to_string();
        self
    }

    pub fn default_filename(&self) -> &str {
        &self.default_filename
    }

    /// Classifies a picked file.
    pub fn prepare(&self, path: &Path) -> Result<SourceFile, TaskError> {
        SourceFile::classify(path)
    }

    /// Runs a conversion.
    pub async fn dispatch(&self, request: &ConversionRequest) -> OperationOutcome {
        self.run_conversion(request, None).await
    }

    /// Runs a conversion, forwarding progress events.
    pub async fn dispatch_with_progress(
        &self,
        request: &ConversionRequest,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> OperationOutcome {
        self.run_conversion(request, Some(progress_tx)).await
    }

    async fn run_conversion(
        &self,
        request: &ConversionRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> OperationOutcome {
        let Some(category) = formats::classify(&request.source_extension).category() else {
            let err = TaskError::UnsupportedFormat {
                extension: request.source_extension.clone(),
            };
            warn!("Refusing to convert {:?}: {}", request.source_path, err);
            return OperationOutcome::failed(&err);
        };

        info!(
            category = %category,
            "Converting {:?} to {}",
            request.source_path,
            request.target_extension
        );

        let result = match category {
            Category::Image => self.convert_image(request, progress_tx).await,
            Category::Video => self.transcode_video(request, progress_tx).await,
        };

        match result {
            Ok(output) => {
                info!("Conversion finished: {:?}", output);
                let detail = format!(
                    "{} converted to {}",
                    request.source().file_name(),
                    request.target_extension.to_uppercase()
                );
                OperationOutcome::succeeded(detail, output)
            }
            Err(e) => {
                error!("Conversion of {:?} failed: {}", request.source_path, e);
                OperationOutcome::failed(&e)
            }
        }
    }

    async fn convert_image(
        &self,
        request: &ConversionRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<PathBuf, TaskError> {
        let task_id = new_task_id();
        if let Some(tx) = &progress_tx {
            let _ = tx.try_send(TaskProgress::new(task_id.as_str(), 0.0, "Converting image"));
        }

        let output = self
            .images
            .convert(&request.source_path, &request.target_extension)
            .await?;

        if let Some(tx) = &progress_tx {
            let _ = tx.try_send(TaskProgress::new(task_id, 100.0, "Image converted"));
        }
        Ok(output)
    }

    async fn transcode_video(
        &self,
        request: &ConversionRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> Result<PathBuf, TaskError> {
        let result = match progress_tx {
            Some(tx) => {
                self.transcoder
                    .transcode_with_progress(&request.source_path, &request.target_extension, tx)
                    .await?
            }
            None => {
                self.transcoder
                    .transcode(&request.source_path, &request.target_extension)
                    .await?
            }
        };
        Ok(result.output_path)
    }

    /// Resolves title and thumbnail URL. Failures are logged, never returned.
    pub async fn resolve(&self, link: &str) -> Option<VideoMetadata> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        let metadata = self.resolver.resolve_metadata(link).await;
        match &metadata {
            Some(meta) => info!("Resolved {}: {:?}", link, meta.title),
            None => warn!("{}", TaskError::UnresolvableLink { link: link.to_string() }),
        }
        metadata
    }

    /// Fetches a thumbnail.
    pub async fn thumbnail(&self, url: &str) -> Result<Thumbnail, TaskError> {
        match self.resolver.fetch_thumbnail(url).await {
            Ok(bytes) => Ok(Thumbnail::from_bytes(bytes)),
            Err(e) => {
                warn!("Thumbnail unavailable: {}", e);
                Err(e.into())
            }
        }
    }

    /// Builds a download request. `None` when no directory was chosen.
    pub fn prepare_download(
        &self,
        link: &str,
        destination: Option<PathBuf>,
        filename: Option<String>,
    ) -> Option<DownloadRequest> {
        destination.map(|dir| DownloadRequest::new(link, dir, filename, &self.default_filename))
    }

    /// Downloads `link` into `destination`.
    ///
    /// A `None` destination means the user cancelled the directory picker:
    /// the outcome is cancelled and the resolver is not called.
    pub async fn download(
        &self,
        link: &str,
        destination: Option<PathBuf>,
        filename: Option<String>,
    ) -> OperationOutcome {
        match self.prepare_download(link, destination, filename) {
            Some(request) => self.execute_download(&request, None).await,
            None => Self::no_destination(),
        }
    }

    /// Same as [`download`](Self::download), forwarding progress events.
    pub async fn download_with_progress(
        &self,
        link: &str,
        destination: Option<PathBuf>,
        filename: Option<String>,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> OperationOutcome {
        match self.prepare_download(link, destination, filename) {
            Some(request) => self.execute_download(&request, Some(progress_tx)).await,
            None => Self::no_destination(),
        }
    }

    fn no_destination() -> OperationOutcome {
        info!("Download cancelled: no destination directory");
        OperationOutcome::cancelled("No destination directory chosen")
    }

    /// Runs a prepared download.
    pub async fn execute_download(
        &self,
        request: &DownloadRequest,
        progress_tx: Option<mpsc::Sender<TaskProgress>>,
    ) -> OperationOutcome {
        let result = match progress_tx {
            Some(tx) => self.resolver.download_with_progress(request, tx).await,
            None => self.resolver.download(request).await,
        };

        match result {
            Ok(result) => {
                let name = result
                    .file_name()
                    .unwrap_or(request.filename.as_str())
                    .to_string();
                OperationOutcome::succeeded(format!("Downloaded {}", name), result.output_path)
            }
            Err(e) => {
                let err = TaskError::from(e);
                error!("Download of {} failed: {}", request.link, err);
                OperationOutcome::failed(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::CollisionPolicy;
    use crate::orchestrator::TaskErrorKind;
    use crate::resolver::ResolverError;
    use crate::testing::{MockResolver, MockTranscoder};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    struct Fixture {
        orchestrator: TaskOrchestrator,
        transcoder: Arc<MockTranscoder>,
        resolver: Arc<MockResolver>,
    }

    fn fixture() -> Fixture {
        let transcoder = Arc::new(MockTranscoder::new());
        let resolver = Arc::new(MockResolver::new());
        let orchestrator = TaskOrchestrator::new(
            ImageConverter::new(CollisionPolicy::Overwrite),
            transcoder.clone(),
            resolver.clone(),
        );
        Fixture {
            orchestrator,
            transcoder,
            resolver,
        }
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 128]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_dispatch_image() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        let source = write_png(dir.path(), "photo.png");

        let request = ConversionRequest::new(&source, "jpeg").unwrap();
        let outcome = f.orchestrator.dispatch(&request).await;

        assert!(outcome.success, "{}", outcome.detail);
        assert_eq!(outcome.output_path, Some(dir.path().join("photo.jpeg")));
        assert!(f.transcoder.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_video_goes_to_transcoder() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("clip.mov");
        std::fs::write(&source, b"mov").unwrap();

        let request = ConversionRequest::new(&source, "mp4").unwrap();
        let outcome = f.orchestrator.dispatch(&request).await;

        assert!(outcome.success);
        assert_eq!(outcome.output_path, Some(dir.path().join("clip.mp4")));
        let calls = f.transcoder.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target_extension, "mp4");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_extension_calls_nothing() {
        let f = fixture();
        let request = ConversionRequest {
            source_path: PathBuf::from("/docs/notes.txt"),
            source_extension: "txt".to_string(),
            target_extension: "mp4".to_string(),
            category: Category::Video,
        };

        let outcome = f.orchestrator.dispatch(&request).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(TaskErrorKind::UnsupportedFormat));
        assert!(f.transcoder.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_missing_image() {
        let f = fixture();
        let request = ConversionRequest::new(Path::new("/nonexistent/photo.png"), "bmp").unwrap();

        let outcome = f.orchestrator.dispatch(&request).await;
        assert_eq!(outcome.error, Some(TaskErrorKind::SourceNotFound));
    }

    #[tokio::test]
    async fn test_dispatch_transcode_failure() {
        let f = fixture();
        f.transcoder
            .set_next_error(crate::converter::TranscodeError::failed("encoder crashed", None))
            .await;
        let request = ConversionRequest::new(Path::new("/v/clip.avi"), "mkv").unwrap();

        let outcome = f.orchestrator.dispatch(&request).await;
        assert_eq!(outcome.error, Some(TaskErrorKind::TranscodeError));
    }

    #[tokio::test]
    async fn test_dispatch_with_progress_reports_events() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        let source = write_png(dir.path(), "photo.png");
        let (tx, mut rx) = mpsc::channel(8);

        let request = ConversionRequest::new(&source, "gif").unwrap();
        let outcome = f.orchestrator.dispatch_with_progress(&request, tx).await;

        assert!(outcome.success);
        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        assert_eq!(last.unwrap().percent, 100.0);
    }

    #[tokio::test]
    async fn test_resolve() {
        let f = fixture();
        f.resolver
            .add_video("https://v.example/1", "A talk", "https://img.example/1.jpg")
            .await;

        let meta = f.orchestrator.resolve(" https://v.example/1 ").await.unwrap();
        assert_eq!(meta.title, "A talk");
        assert!(f.orchestrator.resolve("https://v.example/404").await.is_none());
        assert!(f.orchestrator.resolve("").await.is_none());
    }

    #[tokio::test]
    async fn test_thumbnail_failure_kind() {
        let f = fixture();
        let err = f
            .orchestrator
            .thumbnail("https://img.example/missing.jpg")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TaskErrorKind::NetworkFetchError);
    }

    #[tokio::test]
    async fn test_download_without_destination_is_cancelled() {
        let f = fixture();
        let outcome = f
            .orchestrator
            .download("https://v.example/1", None, Some("talk".into()))
            .await;

        assert!(!outcome.success);
        assert!(outcome.is_cancelled());
        assert!(f.resolver.recorded_downloads().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_defaults_filename() {
        let f = fixture();
        let dir = TempDir::new().unwrap();

        let outcome = f
            .orchestrator
            .download("https://v.example/1", Some(dir.path().to_path_buf()), None)
            .await;

        assert!(outcome.success, "{}", outcome.detail);
        let downloads = f.resolver.recorded_downloads().await;
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].filename, "video");
        assert_eq!(downloads[0].destination_directory, dir.path());
    }

    #[tokio::test]
    async fn test_download_failure_kind() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        f.resolver
            .set_next_error(ResolverError::download_failed("HTTP Error 403", None))
            .await;

        let outcome = f
            .orchestrator
            .download("https://v.example/1", Some(dir.path().to_path_buf()), Some("a/b".into()))
            .await;

        assert_eq!(outcome.error, Some(TaskErrorKind::DownloadError));
        assert_eq!(f.resolver.recorded_downloads().await[0].filename, "a_b");
    }
}
