//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::TranscodeError;
use super::types::{MediaInfo, TranscodeResult};
use crate::progress::TaskProgress;

/// A transcoder that turns one video file into another container.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError>;

    /// Transcodes `source` into a sibling file with `target_extension`.
    async fn transcode(
        &self,
        source: &Path,
        target_extension: &str,
    ) -> Result<TranscodeResult, TranscodeError>;

    /// Transcodes with progress reporting.
    ///
    /// If the receiver is dropped, the transcode continues without progress
    /// reporting. Dropping the returned future stops the encoder.
    async fn transcode_with_progress(
        &self,
        source: &Path,
        target_extension: &str,
        progress_tx: mpsc::Sender<TaskProgress>,
    ) -> Result<TranscodeResult, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
