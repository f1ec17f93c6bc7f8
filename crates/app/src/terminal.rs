//! Line-oriented presenter on stdin/stdout.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use filetools_core::formats::FileFilter;
use filetools_core::{LinkPreview, Notice, NoticeLevel, Presenter, Screen, TaskProgress, UserAction};

/// Presents screens as text menus and reads answers line by line.
pub struct TerminalPresenter {
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Next trimmed input line, `None` at end of input.
    async fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        // next_line is cancel safe, so a dropped render loses no input
        let mut input = self.input.lock().await;
        input
            .next_line()
            .await
            .ok()
            .flatten()
            .map(|line| line.trim().to_string())
    }
}

fn show(screen: &Screen) {
    println!();
    match screen {
        Screen::Welcome => {
            println!("== NT File Tools ==");
            println!("  1) Convert a file");
            println!("  2) Download a video");
            println!("  q) Quit");
        }
        Screen::PickFile { selected } => {
            println!("== Convert a file ==");
            match selected {
                Some(path) => println!("Selected: {}", path.display()),
                None => println!("No file selected."),
            }
            println!("  f) Choose a file");
            if selected.is_some() {
                println!("  c) Continue");
            }
            println!("  b) Back");
        }
        Screen::PickTargetFormat { source, candidates } => {
            println!("== {} ==", source.category.title());
            println!("Convert {} to:", source.file_name());
            for (i, ext) in candidates.iter().enumerate() {
                println!("  {}) {}", i + 1, ext.to_uppercase());
            }
            println!("  b) Back");
        }
        Screen::ConfirmConversion { request, running } => {
            let name = request.source().file_name();
            let target = request.target_extension.to_uppercase();
            if *running {
                println!("Converting {} to {}... (c + Enter to cancel)", name, target);
            } else {
                println!("Convert {} to {}? [y/n]", name, target);
            }
        }
        Screen::EnterLink => {
            println!("== Download a video ==");
            println!("Paste a video link (empty line to go back).");
        }
        Screen::LinkPreview { preview } => {
            show_preview(preview);
            println!("  d) Download");
            println!("  b) Back");
        }
        Screen::Downloading { request, .. } => {
            println!(
                "Downloading to {}... (c + Enter to cancel)",
                request.destination_directory.display()
            );
        }
    }
}

fn show_preview(preview: &LinkPreview) {
    println!("== {} ==", preview.metadata.title);
    match preview.thumbnail.as_ref().and_then(|t| t.dimensions) {
        Some((w, h)) => println!("[thumbnail {}x{}]", w, h),
        None => println!("[no thumbnail]"),
    }
}

/// Maps one input line to an action for `screen`. `None` asks again.
pub fn parse_action(screen: &Screen, input: &str) -> Option<UserAction> {
    let key = input.trim().to_ascii_lowercase();
    match screen {
        Screen::Welcome => match key.as_str() {
            "1" => Some(UserAction::OpenConverter),
            "2" => Some(UserAction::OpenDownloader),
            "q" => Some(UserAction::Exit),
            _ => None,
        },
        Screen::PickFile { selected } => match key.as_str() {
            "f" => Some(UserAction::ChooseFile),
            "c" if selected.is_some() => Some(UserAction::Confirm),
            "b" => Some(UserAction::Cancel),
            "q" => Some(UserAction::Exit),
            _ => None,
        },
        Screen::PickTargetFormat { candidates, .. } => match key.as_str() {
            "b" => Some(UserAction::Cancel),
            "q" => Some(UserAction::Exit),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| candidates.get(i))
                .map(|ext| ext.to_string())
                .or_else(|| candidates.iter().find(|ext| **ext == key).map(|e| e.to_string()))
                .map(UserAction::SelectTarget),
        },
        Screen::ConfirmConversion { running: false, .. } => match key.as_str() {
            "y" | "yes" => Some(UserAction::Confirm),
            "n" | "no" => Some(UserAction::Cancel),
            _ => None,
        },
        Screen::ConfirmConversion { running: true, .. } | Screen::Downloading { .. } => {
            (key == "c").then_some(UserAction::Cancel)
        }
        Screen::EnterLink => {
            if key.is_empty() {
                Some(UserAction::Cancel)
            } else {
                Some(UserAction::SubmitLink(input.trim().to_string()))
            }
        }
        Screen::LinkPreview { .. } => match key.as_str() {
            "d" => Some(UserAction::Download),
            "b" => Some(UserAction::Cancel),
            "q" => Some(UserAction::Exit),
            _ => None,
        },
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn render(&self, screen: &Screen) -> UserAction {
        show(screen);
        loop {
            let Some(line) = self.read_line("> ").await else {
                if screen.is_busy() {
                    // Input closed: let the running task finish
                    return std::future::pending().await;
                }
                return UserAction::Exit;
            };
            if let Some(action) = parse_action(screen, &line) {
                return action;
            }
            if !screen.is_busy() {
                println!("Unrecognized choice: {:?}", line);
            }
        }
    }

    async fn pick_file(&self, filters: &[FileFilter]) -> Option<PathBuf> {
        for filter in filters {
            println!("  {}: {}", filter.name, filter.patterns.join(" "));
        }
        let line = self.read_line("File path (empty to cancel): ").await?;
        (!line.is_empty()).then(|| PathBuf::from(line))
    }

    async fn pick_directory(&self) -> Option<PathBuf> {
        loop {
            let line = self
                .read_line("Destination directory (empty to cancel): ")
                .await?;
            if line.is_empty() {
                return None;
            }
            let dir = PathBuf::from(line);
            if dir.is_dir() {
                return Some(dir);
            }
            println!("Not a directory: {}", dir.display());
        }
    }

    async fn prompt_text(&self, prompt: &str, default: &str) -> Option<String> {
        let line = self.read_line(&format!("{} [{}]: ", prompt, default)).await?;
        (!line.is_empty()).then_some(line)
    }

    async fn report_progress(&self, progress: &TaskProgress) {
        print!("\r{:>5.1}%  {:<60}", progress.percent, progress.status);
        let _ = std::io::stdout().flush();
        if progress.percent >= 100.0 {
            println!();
        }
    }

    async fn notify(&self, notice: &Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "done",
            NoticeLevel::Error => "error",
        };
        println!("[{}] {}", tag, notice.message);
    }
}
