//! Screen states.

use std::fmt;
use std::path::PathBuf;

use crate::orchestrator::{ConversionRequest, SourceFile, Thumbnail};
use crate::resolver::{DownloadRequest, VideoMetadata};

/// A resolved link shown before downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPreview {
    pub link: String,
    pub metadata: VideoMetadata,
    /// `None` renders as a placeholder.
    pub thumbnail: Option<Thumbnail>,
}

/// The single active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    PickFile {
        selected: Option<PathBuf>,
    },
    PickTargetFormat {
        source: SourceFile,
        candidates: Vec<&'static str>,
    },
    ConfirmConversion {
        request: ConversionRequest,
        /// True while the conversion is executing.
        running: bool,
    },
    EnterLink,
    LinkPreview {
        preview: LinkPreview,
    },
    Downloading {
        request: DownloadRequest,
        preview: LinkPreview,
    },
}

/// Discriminant of [`Screen`], handy for assertions and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Welcome,
    PickFile,
    PickTargetFormat,
    ConfirmConversion,
    EnterLink,
    LinkPreview,
    Downloading,
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Welcome => ScreenKind::Welcome,
            Self::PickFile { .. } => ScreenKind::PickFile,
            Self::PickTargetFormat { .. } => ScreenKind::PickTargetFormat,
            Self::ConfirmConversion { .. } => ScreenKind::ConfirmConversion,
            Self::EnterLink => ScreenKind::EnterLink,
            Self::LinkPreview { .. } => ScreenKind::LinkPreview,
            Self::Downloading { .. } => ScreenKind::Downloading,
        }
    }

    /// Whether an operation is running behind this screen. Only `Cancel`
    /// means anything while busy.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::ConfirmConversion { running: true, .. } | Self::Downloading { .. }
        )
    }

    /// Target picker for an already classified source.
    pub fn pick_target(source: SourceFile) -> Self {
        let candidates = source.candidates();
        Self::PickTargetFormat { source, candidates }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Welcome => "welcome",
            Self::PickFile => "pick-file",
            Self::PickTargetFormat => "pick-target-format",
            Self::ConfirmConversion => "confirm-conversion",
            Self::EnterLink => "enter-link",
            Self::LinkPreview => "link-preview",
            Self::Downloading => "downloading",
        };
        f.write_str(name)
    }
}
