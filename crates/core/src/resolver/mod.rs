//! Remote media resolver: link metadata, thumbnails and downloads.
//!
//! Three independent operations that are never chained implicitly:
//!
//! - `resolve_metadata` asks the extractor for title and thumbnail URL
//!   without fetching the media body. Every failure collapses to `None`.
//! - `fetch_thumbnail` is a plain HTTP GET of the thumbnail URL.
//! - `download` retrieves the media into a chosen directory and resets the
//!   file timestamps to the completion time.
//!
//! # Example
//!
//! ```ignore
//! use filetools_core::resolver::{DownloadRequest, MediaResolver, YtDlpResolver};
//!
//! let resolver = YtDlpResolver::with_defaults();
//! if let Some(meta) = resolver.resolve_metadata("https://youtu.be/xyz").await {
//!     let bytes = resolver.fetch_thumbnail(&meta.thumbnail_url).await?;
//!     let request = DownloadRequest::new("https://youtu.be/xyz", "/downloads", None, "video");
//!     let result = resolver.download(&request).await?;
//!     println!("Saved {:?}", result.output_path);
//! }
//! ```

mod config;
mod error;
mod timestamps;
mod traits;
mod types;
mod ytdlp;

pub use config::ResolverConfig;
pub use error::ResolverError;
pub use timestamps::reset_timestamps;
pub use traits::MediaResolver;
pub use types::{sanitize_filename, DownloadRequest, DownloadResult, VideoMetadata};
pub use ytdlp::YtDlpResolver;
