//! Output path derivation and the policy for pre-existing outputs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::formats::normalize_extension;

/// What happens when the derived output path already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Refuse to convert.
    Fail,
    /// Write to `name (1).ext`, `name (2).ext`, ... instead.
    Suffix,
}

/// Sibling path for an image: same directory, same stem, new extension.
pub fn image_output_path(source: &Path, target_extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = format!("{}.{}", stem, normalize_extension(target_extension));
    match source.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Path for a video: the full source path with its extension replaced.
pub fn video_output_path(source: &Path, target_extension: &str) -> PathBuf {
    source.with_extension(normalize_extension(target_extension))
}

/// Applies the collision policy to a derived output path.
///
/// Returns `None` when the path exists and the policy is `Fail`.
pub fn resolve_output_path(path: PathBuf, policy: CollisionPolicy) -> Option<PathBuf> {
    if !path.exists() {
        return Some(path);
    }

    match policy {
        CollisionPolicy::Overwrite => Some(path),
        CollisionPolicy::Fail => None,
        CollisionPolicy::Suffix => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            (1u32..)
                .map(|n| path.with_file_name(format!("{} ({}).{}", stem, n, ext)))
                .find(|candidate| !candidate.exists())
        }
    }
}
