//! The boundary between the controller and whatever draws the screens.

use async_trait::async_trait;
use std::path::PathBuf;

use super::screen::Screen;
use crate::formats::FileFilter;
use crate::orchestrator::OperationOutcome;
use crate::progress::TaskProgress;

/// Something the user did on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    OpenConverter,
    OpenDownloader,
    ChooseFile,
    Confirm,
    SelectTarget(String),
    SubmitLink(String),
    Download,
    Cancel,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Success, info for cancellations, error otherwise.
    pub fn from_outcome(outcome: &OperationOutcome) -> Self {
        if outcome.success {
            Self::success(outcome.detail.clone())
        } else if outcome.is_cancelled() {
            Self::info(outcome.detail.clone())
        } else {
            Self::error(outcome.detail.clone())
        }
    }
}

/// Renders screens and collects user input.
///
/// `None` from any picker or prompt means the user cancelled it.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Shows `screen` and waits for the next action.
    ///
    /// For busy screens the future is dropped when the operation finishes,
    /// so implementations must be cancel safe.
    async fn render(&self, screen: &Screen) -> UserAction;

    async fn pick_file(&self, filters: &[FileFilter]) -> Option<PathBuf>;

    async fn pick_directory(&self) -> Option<PathBuf>;

    /// Asks for a line of text, pre-filled with `default`.
    async fn prompt_text(&self, prompt: &str, default: &str) -> Option<String>;

    async fn report_progress(&self, _progress: &TaskProgress) {}

    async fn notify(&self, _notice: &Notice) {}
}
