//! Trait definitions for the resolver module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ResolverError;
use super::types::{DownloadRequest, DownloadResult, VideoMetadata};
use crate::progress::TaskProgress;

/// Talks to remote video pages.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolves title and thumbnail URL for `link` without downloading the
    /// media body.
    ///
    /// Returns `None` for any failure: unsupported site, network error,
    /// malformed response, or a missing title/thumbnail field.
    async fn resolve_metadata(&self, link: &str) -> Option<VideoMetadata>;

    /// Fetches the raw thumbnail bytes.
    async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<Vec<u8>, ResolverError>;

    /// Downloads the media described by `request`.
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadResult, ResolverError>;

    /// Downloads with progress reporting. Dropping the returned future
    /// aborts the transfer.
    async fn download_with_progress(
        &self,
        request: &DownloadRequest,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> Result<DownloadResult, ResolverError>;
}
