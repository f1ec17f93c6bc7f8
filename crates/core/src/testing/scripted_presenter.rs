//! Presenter that replays a script instead of asking a user.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::formats::FileFilter;
use crate::navigation::{Notice, Presenter, Screen, ScreenKind, UserAction};
use crate::progress::TaskProgress;

/// Replays queued actions and picker answers, recording what was shown.
///
/// - An empty action queue on an idle screen answers `Exit`.
/// - On a busy screen only a queued `Cancel` is consumed. Anything else
///   waits until the running operation finishes and the screen changes.
/// - Empty picker and prompt queues answer `None` (user cancelled).
///
/// # Example
///
/// ```rust,ignore
/// use filetools_core::testing::ScriptedPresenter;
///
/// let presenter = ScriptedPresenter::new([UserAction::OpenConverter, UserAction::ChooseFile])
///     .with_files([Some(PathBuf::from("/pics/photo.png"))]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    actions: Arc<RwLock<VecDeque<UserAction>>>,
    files: Arc<RwLock<VecDeque<Option<PathBuf>>>>,
    directories: Arc<RwLock<VecDeque<Option<PathBuf>>>>,
    texts: Arc<RwLock<VecDeque<Option<String>>>>,

    rendered: Arc<RwLock<Vec<ScreenKind>>>,
    screens: Arc<RwLock<Vec<Screen>>>,
    notices: Arc<RwLock<Vec<Notice>>>,
    progress: Arc<RwLock<Vec<TaskProgress>>>,
    prompts: Arc<RwLock<Vec<(String, String)>>>,
    filters: Arc<RwLock<Vec<FileFilter>>>,
}

impl ScriptedPresenter {
    pub fn new(actions: impl IntoIterator<Item = UserAction>) -> Self {
        Self {
            actions: Arc::new(RwLock::new(actions.into_iter().collect())),
            ..Default::default()
        }
    }

    /// Answers for `pick_file`, in order.
    pub fn with_files(self, files: impl IntoIterator<Item = Option<PathBuf>>) -> Self {
        Self {
            files: Arc::new(RwLock::new(files.into_iter().collect())),
            ..self
        }
    }

    /// Answers for `pick_directory`, in order.
    pub fn with_directories(self, directories: impl IntoIterator<Item = Option<PathBuf>>) -> Self {
        Self {
            directories: Arc::new(RwLock::new(directories.into_iter().collect())),
            ..self
        }
    }

    /// Answers for `prompt_text`, in order.
    pub fn with_texts(self, texts: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            texts: Arc::new(RwLock::new(texts.into_iter().collect())),
            ..self
        }
    }

    /// Kinds of every screen rendered, in order.
    pub async fn rendered(&self) -> Vec<ScreenKind> {
        self.rendered.read().await.clone()
    }

    /// Every screen rendered, in order.
    pub async fn screens(&self) -> Vec<Screen> {
        self.screens.read().await.clone()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.read().await.clone()
    }

    pub async fn progress(&self) -> Vec<TaskProgress> {
        self.progress.read().await.clone()
    }

    /// `(prompt, default)` pairs passed to `prompt_text`.
    pub async fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.read().await.clone()
    }

    /// Filters passed to the last `pick_file` call.
    pub async fn last_filters(&self) -> Vec<FileFilter> {
        self.filters.read().await.clone()
    }

    /// Actions not consumed yet.
    pub async fn remaining_actions(&self) -> usize {
        self.actions.read().await.len()
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn render(&self, screen: &Screen) -> UserAction {
        self.rendered.write().await.push(screen.kind());
        self.screens.write().await.push(screen.clone());

        if screen.is_busy() {
            {
                let mut actions = self.actions.write().await;
                if actions.front() == Some(&UserAction::Cancel) {
                    actions.pop_front();
                    return UserAction::Cancel;
                }
            }
            return std::future::pending().await;
        }

        self.actions
            .write()
            .await
            .pop_front()
            .unwrap_or(UserAction::Exit)
    }

    async fn pick_file(&self, filters: &[FileFilter]) -> Option<PathBuf> {
        *self.filters.write().await = filters.to_vec();
        self.files.write().await.pop_front().flatten()
    }

    async fn pick_directory(&self) -> Option<PathBuf> {
        self.directories.write().await.pop_front().flatten()
    }

    async fn prompt_text(&self, prompt: &str, default: &str) -> Option<String> {
        self.prompts
            .write()
            .await
            .push((prompt.to_string(), default.to_string()));
        self.texts.write().await.pop_front().flatten()
    }

    async fn report_progress(&self, progress: &TaskProgress) {
        self.progress.write().await.push(progress.clone());
    }

    async fn notify(&self, notice: &Notice) {
        self.notices.write().await.push(notice.clone());
    }
}
