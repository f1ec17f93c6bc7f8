//! Extension catalog and the conversion-target rules built on it.

use std::path::Path;

use super::types::{Category, Classification, FileFilter};

/// Recognized image extensions, in display order.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Recognized video extensions, in display order.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "wmv", "mkv"];

/// Lower-cases an extension and strips any leading `*` or `.`.
pub fn normalize_extension(extension: &str) -> String {
    extension
        .trim()
        .trim_start_matches('*')
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

/// Classifies an extension. Total: anything unrecognized is `Unknown`.
pub fn classify(extension: &str) -> Classification {
    let ext = normalize_extension(extension);
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Classification::Known(Category::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Classification::Known(Category::Video)
    } else {
        Classification::Unknown
    }
}

/// Normalized extension of a path, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .filter(|e| !e.is_empty())
}

/// Classifies a path by its extension. A path without one is `Unknown`.
pub fn classify_path(path: &Path) -> Classification {
    extension_of(path)
        .map(|ext| classify(&ext))
        .unwrap_or(Classification::Unknown)
}

/// All registry extensions of a category.
pub fn extensions_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Image => &IMAGE_EXTENSIONS,
        Category::Video => &VIDEO_EXTENSIONS,
    }
}

/// Every recognized extension, images first.
pub fn all_extensions() -> Vec<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(VIDEO_EXTENSIONS.iter())
        .copied()
        .collect()
}

/// The other spelling of the same logical format, if any.
fn alias_of(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" => Some("jpeg"),
        "jpeg" => Some("jpg"),
        _ => None,
    }
}

/// Extensions a file of `category` may be converted into.
///
/// The source extension is always excluded. For images its alias is
/// excluded as well, so a `.jpg` source never offers `jpeg` and vice versa.
pub fn targets_for(category: Category, excluding_extension: &str) -> Vec<&'static str> {
    let source = normalize_extension(excluding_extension);
    let alias = match category {
        Category::Image => alias_of(&source),
        Category::Video => None,
    };

    extensions_for(category)
        .iter()
        .copied()
        .filter(|ext| *ext != source && Some(*ext) != alias)
        .collect()
}

/// Filter groups offered by the file picker.
pub fn picker_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::from_extensions("All Supported Files", &all_extensions()),
        FileFilter::from_extensions("Image Files", &IMAGE_EXTENSIONS),
        FileFilter::from_extensions("Video Files", &VIDEO_EXTENSIONS),
    ]
}
