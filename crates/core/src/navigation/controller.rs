//! The navigation state machine.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::presenter::{Notice, Presenter, UserAction};
use super::screen::{LinkPreview, Screen};
use crate::formats::{self, Category};
use crate::orchestrator::{ConversionRequest, OperationOutcome, TaskOrchestrator};
use crate::progress::TaskProgress;
use crate::resolver::DownloadRequest;

const PROGRESS_BUFFER: usize = 32;

/// What to do after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(Screen),
    Exit,
}

/// Drives screens through the presenter and hands confirmed work to the
/// orchestrator.
pub struct NavigationController {
    orchestrator: Arc<TaskOrchestrator>,
    presenter: Arc<dyn Presenter>,
}

impl NavigationController {
    pub fn new(orchestrator: Arc<TaskOrchestrator>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            orchestrator,
            presenter,
        }
    }

    /// Runs from the welcome screen until the user exits.
    pub async fn run(&self) {
        self.run_from(Screen::Welcome).await;
    }

    /// Runs from `screen` until the user exits.
    pub async fn run_from(&self, mut screen: Screen) {
        info!("Navigation started at {}", screen.kind());
        loop {
            match self.advance(screen).await {
                Transition::Next(next) => screen = next,
                Transition::Exit => break,
            }
        }
        info!("Navigation finished");
    }

    /// Shows the current screen and applies the user's answer.
    ///
    /// `Downloading` is not shown for input: entering it starts the download.
    pub async fn advance(&self, screen: Screen) -> Transition {
        if let Screen::Downloading { request, preview } = screen {
            return Transition::Next(self.download(request, preview).await);
        }

        let action = self.presenter.render(&screen).await;
        debug!("{} <- {:?}", screen.kind(), action);
        self.step(screen, action).await
    }

    /// Applies `action` to `screen`.
    pub async fn step(&self, screen: Screen, action: UserAction) -> Transition {
        let next = match (screen, action) {
            (Screen::Welcome, UserAction::OpenConverter) => Screen::PickFile { selected: None },
            (Screen::Welcome, UserAction::OpenDownloader) => Screen::EnterLink,

            (Screen::PickFile { selected }, UserAction::ChooseFile) => {
                let picked = self.presenter.pick_file(&formats::picker_filters()).await;
                Screen::PickFile {
                    selected: picked.or(selected),
                }
            }
            (Screen::PickFile { selected: Some(path) }, UserAction::Confirm) => {
                match self.orchestrator.prepare(&path) {
                    Ok(source) => Screen::pick_target(source),
                    Err(e) => {
                        warn!("Rejected {:?}: {}", path, e);
                        self.notify(Notice::error(e.to_string())).await;
                        Screen::Welcome
                    }
                }
            }
            (Screen::PickFile { selected: Some(_) }, UserAction::Cancel) => {
                Screen::PickFile { selected: None }
            }
            (Screen::PickFile { selected: None }, UserAction::Cancel) => Screen::Welcome,

            (Screen::PickTargetFormat { source, candidates }, UserAction::SelectTarget(target)) => {
                match ConversionRequest::for_source(&source, &target) {
                    Ok(request) => Screen::ConfirmConversion {
                        request,
                        running: false,
                    },
                    Err(e) => {
                        debug!("Ignoring target {:?}: {}", target, e);
                        Screen::PickTargetFormat { source, candidates }
                    }
                }
            }
            (Screen::PickTargetFormat { source, .. }, UserAction::Cancel) => Screen::PickFile {
                selected: Some(source.path),
            },

            (Screen::ConfirmConversion { request, .. }, UserAction::Confirm) => {
                self.convert(request).await
            }
            (Screen::ConfirmConversion { request, .. }, UserAction::Cancel) => {
                Screen::pick_target(request.source())
            }

            (Screen::EnterLink, UserAction::SubmitLink(link)) => self.preview(link).await,
            (Screen::EnterLink, UserAction::Cancel | UserAction::Exit) => Screen::Welcome,

            (Screen::LinkPreview { preview }, UserAction::Download) => {
                self.choose_destination(preview).await
            }
            (Screen::LinkPreview { .. }, UserAction::Cancel) => Screen::EnterLink,

            // `advance` never renders this screen; callers of `step` still start the download
            (Screen::Downloading { request, preview }, _) => self.download(request, preview).await,

            // Closing the window quits from anywhere else
            (_, UserAction::Exit) => return Transition::Exit,

            (screen, action) => {
                debug!("{:?} does nothing on {}", action, screen.kind());
                screen
            }
        };

        Transition::Next(next)
    }

    async fn convert(&self, request: ConversionRequest) -> Screen {
        let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
        let job = request.clone();

        let outcome = match request.category {
            // Image conversion runs on a blocking thread and cannot be interrupted
            Category::Image => {
                let outcome = self.orchestrator.dispatch_with_progress(&job, tx).await;
                self.drain_progress(rx).await;
                outcome
            }
            Category::Video => {
                let view = Screen::ConfirmConversion {
                    request: request.clone(),
                    running: true,
                };
                let task = self.orchestrator.dispatch_with_progress(&job, tx);
                self.run_cancellable(&view, rx, task)
                    .await
                    .unwrap_or_else(|| OperationOutcome::cancelled("Conversion cancelled"))
            }
        };

        self.notify(Notice::from_outcome(&outcome)).await;
        if outcome.success {
            Screen::Welcome
        } else if outcome.is_cancelled() {
            Screen::pick_target(request.source())
        } else {
            Screen::Welcome
        }
    }

    async fn preview(&self, link: String) -> Screen {
        let link = link.trim().to_string();
        let Some(metadata) = self.orchestrator.resolve(&link).await else {
            self.notify(Notice::error(
                "Could not retrieve video information. Check the link and try again.",
            ))
            .await;
            return Screen::EnterLink;
        };

        let thumbnail = self
            .orchestrator
            .thumbnail(&metadata.thumbnail_url)
            .await
            .ok();

        Screen::LinkPreview {
            preview: LinkPreview {
                link,
                metadata,
                thumbnail,
            },
        }
    }

    async fn choose_destination(&self, preview: LinkPreview) -> Screen {
        let Some(directory) = self.presenter.pick_directory().await else {
            // Reported through the orchestrator so the outcome stays uniform
            let outcome = self.orchestrator.download(&preview.link, None, None).await;
            self.notify(Notice::from_outcome(&outcome)).await;
            return Screen::LinkPreview { preview };
        };

        let default = self.orchestrator.default_filename().to_string();
        let filename = self
            .presenter
            .prompt_text("Enter a file name", &default)
            .await;

        match self
            .orchestrator
            .prepare_download(&preview.link, Some(directory), filename)
        {
            Some(request) => Screen::Downloading { request, preview },
            None => Screen::LinkPreview { preview },
        }
    }

    async fn download(&self, request: DownloadRequest, preview: LinkPreview) -> Screen {
        let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
        let job = request.clone();
        let view = Screen::Downloading { request, preview };

        let task = self.orchestrator.execute_download(&job, Some(tx));
        let outcome = self
            .run_cancellable(&view, rx, task)
            .await
            .unwrap_or_else(|| OperationOutcome::cancelled("Download cancelled"));

        self.notify(Notice::from_outcome(&outcome)).await;
        let Screen::Downloading { preview, .. } = view else {
            return Screen::Welcome;
        };

        if outcome.success {
            Screen::EnterLink
        } else if outcome.is_cancelled() {
            Screen::LinkPreview { preview }
        } else {
            Screen::Welcome
        }
    }

    /// Races `task` against the presenter.
    ///
    /// Progress events are forwarded while the task runs. Returns `None` if
    /// the user cancelled, in which case `task` is dropped before completion.
    async fn run_cancellable<F>(
        &self,
        view: &Screen,
        mut progress_rx: mpsc::Receiver<TaskProgress>,
        task: F,
    ) -> Option<OperationOutcome>
    where
        F: Future<Output = OperationOutcome>,
    {
        tokio::pin!(task);
        let mut render = self.presenter.render(view);

        loop {
            tokio::select! {
                biased;

                outcome = &mut task => {
                    // Flush whatever arrived before completion
                    self.drain_progress(progress_rx).await;
                    return Some(outcome);
                }
                Some(progress) = progress_rx.recv() => {
                    self.presenter.report_progress(&progress).await;
                }
                action = &mut render => {
                    if action == UserAction::Cancel {
                        info!("{} cancelled by user", view.kind());
                        return None;
                    }
                    debug!("Ignoring {:?} while busy", action);
                    render = self.presenter.render(view);
                }
            }
        }
    }

    async fn drain_progress(&self, mut progress_rx: mpsc::Receiver<TaskProgress>) {
        while let Ok(progress) = progress_rx.try_recv() {
            self.presenter.report_progress(&progress).await;
        }
    }

    async fn notify(&self, notice: Notice) {
        self.presenter.notify(&notice).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use crate::converter::{CollisionPolicy, ImageConverter};
    use crate::navigation::{NoticeLevel, ScreenKind};
    use crate::orchestrator::SourceFile;
    use crate::resolver::VideoMetadata;
    use crate::testing::{fixtures, MockResolver, MockTranscoder, ScriptedPresenter};
    use tempfile::TempDir;

    struct Harness {
        controller: NavigationController,
        presenter: Arc<ScriptedPresenter>,
        transcoder: Arc<MockTranscoder>,
        resolver: Arc<MockResolver>,
    }

    fn harness(presenter: ScriptedPresenter) -> Harness {
        let presenter = Arc::new(presenter);
        let transcoder = Arc::new(MockTranscoder::new());
        let resolver = Arc::new(MockResolver::new());
        let orchestrator = Arc::new(TaskOrchestrator::new(
            ImageConverter::new(CollisionPolicy::Overwrite),
            transcoder.clone(),
            resolver.clone(),
        ));
        Harness {
            controller: NavigationController::new(orchestrator, presenter.clone()),
            presenter,
            transcoder,
            resolver,
        }
    }

    fn next(transition: Transition) -> Screen {
        match transition {
            Transition::Next(screen) => screen,
            Transition::Exit => panic!("controller exited"),
        }
    }

    fn preview() -> LinkPreview {
        LinkPreview {
            link: "https://v.example/1".to_string(),
            metadata: VideoMetadata {
                title: "A talk".to_string(),
                thumbnail_url: "https://img.example/1.jpg".to_string(),
            },
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn test_welcome_transitions() {
        let h = harness(ScriptedPresenter::default());
        let c = &h.controller;

        assert_eq!(
            next(c.step(Screen::Welcome, UserAction::OpenConverter).await),
            Screen::PickFile { selected: None }
        );
        assert_eq!(
            next(c.step(Screen::Welcome, UserAction::OpenDownloader).await),
            Screen::EnterLink
        );
        assert_eq!(c.step(Screen::Welcome, UserAction::Exit).await, Transition::Exit);
        assert_eq!(
            next(c.step(Screen::Welcome, UserAction::Download).await),
            Screen::Welcome
        );
    }

    #[tokio::test]
    async fn test_choose_file_keeps_selection_on_cancel() {
        let h = harness(
            ScriptedPresenter::default().with_files([Some(PathBuf::from("/p/a.png")), None]),
        );
        let c = &h.controller;

        let screen = next(c.step(Screen::PickFile { selected: None }, UserAction::ChooseFile).await);
        assert_eq!(
            screen,
            Screen::PickFile {
                selected: Some(PathBuf::from("/p/a.png"))
            }
        );
        assert_eq!(h.presenter.last_filters().await.len(), 3);

        let screen = next(c.step(screen, UserAction::ChooseFile).await);
        assert_eq!(
            screen,
            Screen::PickFile {
                selected: Some(PathBuf::from("/p/a.png"))
            }
        );
    }

    #[tokio::test]
    async fn test_pick_file_cancel() {
        let h = harness(ScriptedPresenter::default());
        let c = &h.controller;

        let selected = Screen::PickFile {
            selected: Some(PathBuf::from("/p/a.png")),
        };
        assert_eq!(
            next(c.step(selected, UserAction::Cancel).await),
            Screen::PickFile { selected: None }
        );
        assert_eq!(
            next(c.step(Screen::PickFile { selected: None }, UserAction::Cancel).await),
            Screen::Welcome
        );
        // Nothing to confirm yet
        assert_eq!(
            next(c.step(Screen::PickFile { selected: None }, UserAction::Confirm).await),
            Screen::PickFile { selected: None }
        );
    }

    #[tokio::test]
    async fn test_confirm_unknown_file_returns_to_welcome() {
        let h = harness(ScriptedPresenter::default());
        let screen = Screen::PickFile {
            selected: Some(PathBuf::from("/docs/notes.txt")),
        };

        assert_eq!(
            next(h.controller.step(screen, UserAction::Confirm).await),
            Screen::Welcome
        );
        let notices = h.presenter.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_select_target() {
        let h = harness(ScriptedPresenter::default());
        let c = &h.controller;
        let source = SourceFile::classify(Path::new("/p/a.jpg")).unwrap();

        let screen = next(
            c.step(Screen::pick_target(source.clone()), UserAction::SelectTarget("jpeg".into()))
                .await,
        );
        assert_eq!(screen.kind(), ScreenKind::PickTargetFormat);

        let screen = next(c.step(screen, UserAction::SelectTarget("png".into())).await);
        match &screen {
            Screen::ConfirmConversion { request, running } => {
                assert_eq!(request.target_extension, "png");
                assert!(!running);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }

        let back = next(c.step(screen, UserAction::Cancel).await);
        assert_eq!(back, Screen::pick_target(source.clone()));

        assert_eq!(
            next(c.step(back, UserAction::Cancel).await),
            Screen::PickFile {
                selected: Some(PathBuf::from("/p/a.jpg"))
            }
        );
    }

    #[tokio::test]
    async fn test_confirm_image_conversion() {
        let dir = TempDir::new().unwrap();
        let source = fixtures::png_with_alpha(dir.path(), "photo.png").unwrap();
        let h = harness(ScriptedPresenter::default());

        let request = ConversionRequest::new(&source, "jpg").unwrap();
        let screen = Screen::ConfirmConversion {
            request,
            running: false,
        };

        assert_eq!(
            next(h.controller.step(screen, UserAction::Confirm).await),
            Screen::Welcome
        );
        assert!(dir.path().join("photo.jpg").exists());
        assert_eq!(h.presenter.notices().await[0].level, NoticeLevel::Success);
        assert!(!h.presenter.progress().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_running_transcode() {
        let h = harness(ScriptedPresenter::new([UserAction::Cancel]));
        h.transcoder.set_duration(Duration::from_secs(30)).await;

        let request = ConversionRequest::new(Path::new("/v/clip.mov"), "mp4").unwrap();
        let screen = Screen::ConfirmConversion {
            request,
            running: false,
        };

        let screen = next(h.controller.step(screen, UserAction::Confirm).await);
        assert_eq!(screen.kind(), ScreenKind::PickTargetFormat);
        assert_eq!(h.presenter.rendered().await, vec![ScreenKind::ConfirmConversion]);
        assert_eq!(h.presenter.notices().await[0].level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn test_failed_transcode_returns_to_welcome() {
        let h = harness(ScriptedPresenter::default());
        h.transcoder
            .set_next_error(crate::converter::TranscodeError::failed("boom", None))
            .await;

        let request = ConversionRequest::new(Path::new("/v/clip.mov"), "mkv").unwrap();
        let screen = Screen::ConfirmConversion {
            request,
            running: false,
        };

        assert_eq!(
            next(h.controller.step(screen, UserAction::Confirm).await),
            Screen::Welcome
        );
        assert_eq!(h.presenter.notices().await[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_transcode_progress_is_forwarded() {
        let h = harness(ScriptedPresenter::default());
        h.transcoder.set_duration(Duration::from_millis(50)).await;

        let request = ConversionRequest::new(Path::new("/v/clip.wmv"), "mp4").unwrap();
        let screen = Screen::ConfirmConversion {
            request,
            running: false,
        };

        assert_eq!(
            next(h.controller.step(screen, UserAction::Confirm).await),
            Screen::Welcome
        );
        let progress = h.presenter.progress().await;
        assert_eq!(progress.len(), 5);
        assert_eq!(progress.last().unwrap().percent, 100.0);
    }

    #[tokio::test]
    async fn test_submit_link() {
        let h = harness(ScriptedPresenter::default());
        h.resolver
            .add_video("https://v.example/1", "A talk", "https://img.example/1.jpg")
            .await;
        h.resolver
            .set_thumbnail("https://img.example/1.jpg", fixtures::png_bytes(4, 4).unwrap())
            .await;

        let screen = next(
            h.controller
                .step(Screen::EnterLink, UserAction::SubmitLink(" https://v.example/1 ".into()))
                .await,
        );
        match screen {
            Screen::LinkPreview { preview } => {
                assert_eq!(preview.link, "https://v.example/1");
                assert_eq!(preview.metadata.title, "A talk");
                assert_eq!(preview.thumbnail.unwrap().dimensions, Some((4, 4)));
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_thumbnail_failure_shows_placeholder() {
        let h = harness(ScriptedPresenter::default());
        h.resolver
            .add_video("https://v.example/1", "A talk", "https://img.example/gone.jpg")
            .await;

        let screen = next(
            h.controller
                .step(Screen::EnterLink, UserAction::SubmitLink("https://v.example/1".into()))
                .await,
        );
        match screen {
            Screen::LinkPreview { preview } => assert!(preview.thumbnail.is_none()),
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_enter_link_exit_and_cancel() {
        let h = harness(ScriptedPresenter::default());
        let c = &h.controller;
        assert_eq!(next(c.step(Screen::EnterLink, UserAction::Exit).await), Screen::Welcome);
        assert_eq!(next(c.step(Screen::EnterLink, UserAction::Cancel).await), Screen::Welcome);
    }

    #[tokio::test]
    async fn test_link_preview_to_downloading() {
        let dir = TempDir::new().unwrap();
        let h = harness(
            ScriptedPresenter::default()
                .with_directories([Some(dir.path().to_path_buf())])
                .with_texts([Some("my/talk".to_string())]),
        );

        let screen = next(
            h.controller
                .step(Screen::LinkPreview { preview: preview() }, UserAction::Download)
                .await,
        );
        match &screen {
            Screen::Downloading { request, .. } => {
                assert_eq!(request.filename, "my_talk");
                assert_eq!(request.destination_directory, dir.path());
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(
            h.presenter.prompts().await,
            vec![("Enter a file name".to_string(), "video".to_string())]
        );
        assert!(h.resolver.recorded_downloads().await.is_empty());

        // Entering Downloading runs the download
        assert_eq!(next(h.controller.advance(screen).await), Screen::EnterLink);
        assert!(dir.path().join("my_talk.mp4").exists());
    }

    #[tokio::test]
    async fn test_cancel_running_download() {
        let dir = TempDir::new().unwrap();
        let h = harness(ScriptedPresenter::new([UserAction::Cancel]));
        h.resolver.set_duration(Duration::from_secs(30)).await;

        let request = DownloadRequest::new("https://v.example/1", dir.path(), None, "video");
        let screen = Screen::Downloading {
            request,
            preview: preview(),
        };

        assert_eq!(
            next(h.controller.advance(screen).await),
            Screen::LinkPreview { preview: preview() }
        );
        assert!(!dir.path().join("video.mp4").exists());
    }

    #[tokio::test]
    async fn test_failed_download_returns_to_welcome() {
        let dir = TempDir::new().unwrap();
        let h = harness(ScriptedPresenter::default());
        h.resolver
            .set_next_error(crate::resolver::ResolverError::download_failed("403", None))
            .await;

        let request = DownloadRequest::new("https://v.example/1", dir.path(), None, "video");
        let screen = Screen::Downloading {
            request,
            preview: preview(),
        };

        assert_eq!(next(h.controller.advance(screen).await), Screen::Welcome);
        assert_eq!(h.presenter.notices().await[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_step_on_downloading_runs_download() {
        let dir = TempDir::new().unwrap();
        let h = harness(ScriptedPresenter::default());

        let request = DownloadRequest::new("https://v.example/1", dir.path(), None, "video");
        let screen = Screen::Downloading {
            request,
            preview: preview(),
        };

        assert_eq!(
            next(h.controller.step(screen, UserAction::Confirm).await),
            Screen::EnterLink
        );
        assert_eq!(h.resolver.recorded_downloads().await.len(), 1);
        assert!(dir.path().join("video.mp4").exists());
    }

    #[tokio::test]
    async fn test_exit_from_inner_screen() {
        let h = harness(ScriptedPresenter::default());
        assert_eq!(
            h.controller
                .step(Screen::PickFile { selected: None }, UserAction::Exit)
                .await,
            Transition::Exit
        );
    }
}
