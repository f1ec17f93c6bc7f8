//! In-process image conversion backed by the `image` crate.

use image::{ColorType, DynamicImage, ImageError, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::ImageConvertError;
use super::output::{image_output_path, resolve_output_path, CollisionPolicy};
use crate::formats::normalize_extension;

/// Converts one image file into another image format.
#[derive(Debug, Clone, Default)]
pub struct ImageConverter {
    collision_policy: CollisionPolicy,
}

impl ImageConverter {
    /// Creates a new image converter with the given collision policy.
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self { collision_policy }
    }

    /// Creates a converter that overwrites existing outputs.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Converts `source` into a sibling file with `target_extension`.
    ///
    /// Decoding and encoding run on the blocking thread pool.
    pub async fn convert(
        &self,
        source: &Path,
        target_extension: &str,
    ) -> Result<PathBuf, ImageConvertError> {
        let source = source.to_path_buf();
        let target = normalize_extension(target_extension);
        let policy = self.collision_policy;

        tokio::task::spawn_blocking(move || convert_blocking(&source, &target, policy))
            .await
            .map_err(|e| ImageConvertError::unexpected(format!("conversion task failed: {}", e)))?
    }
}

fn convert_blocking(
    source: &Path,
    target: &str,
    policy: CollisionPolicy,
) -> Result<PathBuf, ImageConvertError> {
    let format = ImageFormat::from_extension(target)
        .ok_or_else(|| ImageConvertError::encode(format!("no encoder for .{}", target)))?;

    let reader = ImageReader::open(source).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ImageConvertError::SourceNotFound {
                path: source.to_path_buf(),
            }
        } else {
            ImageConvertError::unexpected(e.to_string())
        }
    })?;
    let img = reader
        .with_guessed_format()
        .map_err(|e| ImageConvertError::unexpected(e.to_string()))?
        .decode()
        .map_err(map_image_error)?;

    debug!(
        "Decoded {:?}: {}x{} {:?}",
        source,
        img.width(),
        img.height(),
        img.color()
    );

    let derived = image_output_path(source, target);
    let output = resolve_output_path(derived.clone(), policy)
        .ok_or(ImageConvertError::OutputExists { path: derived })?;

    info!("Saving image as {:?} to {:?}", format, output);
    prepare_for_format(img, format)
        .save_with_format(&output, format)
        .map_err(map_image_error)?;

    Ok(output)
}

/// Normalizes the pixel layout to something `format` can encode.
///
/// JPEG has no alpha channel and only 8-bit samples, so transparent or
/// high bit-depth sources are flattened to opaque 8-bit RGB. The GIF
/// encoder only takes RGB(A)8, BMP only takes 8-bit samples.
pub fn prepare_for_format(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = img.color();
    match format {
        ImageFormat::Jpeg => match color {
            ColorType::L8 | ColorType::Rgb8 => img,
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        },
        ImageFormat::Gif => match color {
            ColorType::Rgb8 | ColorType::Rgba8 => img,
            _ => to_eight_bit_rgb(img),
        },
        ImageFormat::Bmp if color.bytes_per_pixel() > color.channel_count() => {
            to_eight_bit_rgb(img)
        }
        _ => img,
    }
}

fn to_eight_bit_rgb(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

fn map_image_error(err: ImageError) -> ImageConvertError {
    match err {
        ImageError::Decoding(_)
        | ImageError::Encoding(_)
        | ImageError::Unsupported(_)
        | ImageError::IoError(_) => ImageConvertError::encode(err.to_string()),
        other => ImageConvertError::unexpected(other.to_string()),
    }
}
