//! Converter module for turning a local file into another format.
//!
//! Images are decoded and re-encoded in-process with the `image` crate.
//! Videos are transcoded by an external FFmpeg process using a fixed
//! encoding profile.
//!
//! # Features
//!
//! - Sibling output naming (`photo.png` -> `photo.jpeg`)
//! - Alpha removal when the target cannot store transparency (JPEG)
//! - Explicit policy for existing output files
//! - Progress reporting and kill-on-cancel for video transcodes
//!
//! # Example
//!
//! ```ignore
//! use filetools_core::converter::{FfmpegTranscoder, ImageConverter, Transcoder};
//!
//! let images = ImageConverter::with_defaults();
//! let output = images.convert(Path::new("/photos/photo.png"), "jpeg").await?;
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//! let result = transcoder.transcode(Path::new("/videos/clip.mov"), "mp4").await?;
//! println!("Transcoded in {} ms", result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod image_converter;
mod output;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::{ImageConvertError, TranscodeError};
pub use ffmpeg::FfmpegTranscoder;
pub use image_converter::{prepare_for_format, ImageConverter};
pub use output::{image_output_path, resolve_output_path, video_output_path, CollisionPolicy};
pub use traits::Transcoder;
pub use types::{EncodingProfile, MediaInfo, TranscodeResult};
