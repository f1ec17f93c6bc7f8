//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the external tools (ffmpeg, yt-dlp) so the controller
//! can be driven end to end without them. Image conversion has no mock: it
//! runs in-process and is fast enough to exercise for real.
//!
//! # Example
//!
//! ```rust,ignore
//! use filetools_core::testing::{MockResolver, MockTranscoder, ScriptedPresenter};
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! let resolver = Arc::new(MockResolver::new());
//! let presenter = Arc::new(ScriptedPresenter::new([UserAction::OpenDownloader]));
//!
//! resolver.add_video("https://v.example/1", "A talk", "https://img.example/1.jpg").await;
//! ```

mod mock_resolver;
mod mock_transcoder;
mod scripted_presenter;

pub use mock_resolver::MockResolver;
pub use mock_transcoder::{MockTranscoder, RecordedTranscode};
pub use scripted_presenter::ScriptedPresenter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageFormat, ImageResult, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    /// Writes a small semi-transparent PNG and returns its path.
    pub fn png_with_alpha(dir: &Path, name: &str) -> ImageResult<PathBuf> {
        let path = dir.join(name);
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 128, if x < 8 { 255 } else { 64 }])
        });
        img.save_with_format(&path, ImageFormat::Png)?;
        Ok(path)
    }

    /// Encoded PNG bytes, e.g. for thumbnails.
    pub fn png_bytes(width: u32, height: u32) -> ImageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Writes a file with arbitrary content.
    pub fn file_with(dir: &Path, name: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
