//! Types for the task orchestrator.

use chrono::{DateTime, Utc};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::converter::{ImageConvertError, TranscodeError};
use crate::formats::{self, Category, Classification};
use crate::resolver::ResolverError;

/// User-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    UnsupportedFormat,
    SourceNotFound,
    EncodeError,
    TranscodeError,
    UnresolvableLink,
    NetworkFetchError,
    DownloadError,
    UnexpectedError,
    UserCancelled,
}

impl TaskErrorKind {
    /// Cancellation returns to the previous screen; everything else to Welcome.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

impl fmt::Display for TaskErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnsupportedFormat => "unsupported format",
            Self::SourceNotFound => "source not found",
            Self::EncodeError => "encode error",
            Self::TranscodeError => "transcode error",
            Self::UnresolvableLink => "unresolvable link",
            Self::NetworkFetchError => "network fetch error",
            Self::DownloadError => "download error",
            Self::UnexpectedError => "unexpected error",
            Self::UserCancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by orchestrated operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The source extension is not in the format registry.
    #[error("Unsupported file format: {extension:?}")]
    UnsupportedFormat { extension: String },

    /// The requested target is not a candidate for the source.
    #[error("Cannot convert .{source_extension} to .{target_extension}")]
    InvalidTarget {
        source_extension: String,
        target_extension: String,
    },

    #[error(transparent)]
    Image(#[from] ImageConvertError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// The link yielded no metadata.
    #[error("Could not retrieve video information for {link}")]
    UnresolvableLink { link: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl TaskError {
    /// Maps the error onto its user-facing category.
    pub fn kind(&self) -> TaskErrorKind {
        match self {
            Self::UnsupportedFormat { .. } | Self::InvalidTarget { .. } => {
                TaskErrorKind::UnsupportedFormat
            }
            Self::Image(e) => match e {
                ImageConvertError::SourceNotFound { .. } => TaskErrorKind::SourceNotFound,
                ImageConvertError::Encode { .. } | ImageConvertError::OutputExists { .. } => {
                    TaskErrorKind::EncodeError
                }
                ImageConvertError::Unexpected { .. } => TaskErrorKind::UnexpectedError,
            },
            // Every transcoder failure is one category for the user
            Self::Transcode(_) => TaskErrorKind::TranscodeError,
            Self::Resolver(ResolverError::ThumbnailFetch { .. }) => TaskErrorKind::NetworkFetchError,
            Self::Resolver(_) => TaskErrorKind::DownloadError,
            Self::UnresolvableLink { .. } => TaskErrorKind::UnresolvableLink,
            Self::Cancelled => TaskErrorKind::UserCancelled,
        }
    }
}

/// Result of one orchestrated operation, consumed once by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub success: bool,
    /// Message suitable for showing to the user.
    pub detail: String,
    pub error: Option<TaskErrorKind>,
    pub output_path: Option<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

impl OperationOutcome {
    pub fn succeeded(detail: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            success: true,
            detail: detail.into(),
            error: None,
            output_path: Some(output_path),
            finished_at: Utc::now(),
        }
    }

    pub fn failed(error: &TaskError) -> Self {
        Self {
            success: false,
            detail: error.to_string(),
            error: Some(error.kind()),
            output_path: None,
            finished_at: Utc::now(),
        }
    }

    /// A failure caused by the user backing out, with its own message.
    pub fn cancelled(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            ..Self::failed(&TaskError::Cancelled)
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.error.is_some_and(|k| k.is_cancellation())
    }
}

/// A picked file whose extension is in the format registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Normalized (lowercase, no dot) extension.
    pub extension: String,
    pub category: Category,
}

impl SourceFile {
    /// Classifies `path`. Unknown or missing extensions are rejected.
    pub fn classify(path: &Path) -> Result<Self, TaskError> {
        let extension = formats::extension_of(path).unwrap_or_default();
        match formats::classify(&extension) {
            Classification::Known(category) => Ok(Self {
                path: path.to_path_buf(),
                extension,
                category,
            }),
            Classification::Unknown => Err(TaskError::UnsupportedFormat { extension }),
        }
    }

    /// Formats this file can be converted to, in registry order.
    pub fn candidates(&self) -> Vec<&'static str> {
        formats::targets_for(self.category, &self.extension)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// A confirmed conversion.
///
/// The category is fixed when the request is built and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub source_extension: String,
    pub target_extension: String,
    pub category: Category,
}

impl ConversionRequest {
    /// Builds a request for converting `source_path` to `target_extension`.
    pub fn new(source_path: &Path, target_extension: &str) -> Result<Self, TaskError> {
        Self::for_source(&SourceFile::classify(source_path)?, target_extension)
    }

    /// Builds a request for an already classified source.
    pub fn for_source(source: &SourceFile, target_extension: &str) -> Result<Self, TaskError> {
        let target = formats::normalize_extension(target_extension);
        if !source.candidates().contains(&target.as_str()) {
            return Err(TaskError::InvalidTarget {
                source_extension: source.extension.clone(),
                target_extension: target,
            });
        }

        Ok(Self {
            source_path: source.path.clone(),
            source_extension: source.extension.clone(),
            target_extension: target,
            category: source.category,
        })
    }

    /// The source file this request was built from.
    pub fn source(&self) -> SourceFile {
        SourceFile {
            path: self.source_path.clone(),
            extension: self.source_extension.clone(),
            category: self.category,
        }
    }
}

/// Thumbnail bytes with their pixel size, when the bytes decode as an image.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub dimensions: Option<(u32, u32)>,
}

impl Thumbnail {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let dimensions = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());
        Self { bytes, dimensions }
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("len", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
