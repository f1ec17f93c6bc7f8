//! Types for the format registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media a file holds, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Still images (png, jpg, jpeg, gif, bmp).
    Image,
    /// Video containers (mp4, avi, mov, wmv, mkv).
    Video,
}

impl Category {
    /// Heading shown above the list of target formats.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Image => "Image types",
            Self::Video => "Video types",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Result of looking an extension up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The extension belongs to exactly one category.
    Known(Category),
    /// The extension is in neither the image nor the video set.
    Unknown,
}

impl Classification {
    /// Returns the category if the extension was recognized.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Unknown => None,
        }
    }
}

/// A named group of glob patterns handed to a file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    /// Label shown by the picker (e.g. "Image Files").
    pub name: String,
    /// Glob patterns, e.g. `*.png`.
    pub patterns: Vec<String>,
}

impl FileFilter {
    /// Builds a filter from bare extensions.
    pub fn from_extensions(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: extensions.iter().map(|ext| format!("*.{}", ext)).collect(),
        }
    }

    /// Bare extensions of this filter, without the `*.` prefix.
    pub fn extensions(&self) -> Vec<&str> {
        self.patterns
            .iter()
            .map(|p| p.trim_start_matches("*.").trim_start_matches('.'))
            .collect()
    }
}
