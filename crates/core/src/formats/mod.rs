//! Static catalog of the image and video formats the tools understand.
//!
//! The registry classifies a file by its extension and enumerates the
//! formats a file of a given category can be converted into.
//!
//! # Example
//!
//! ```ignore
//! use filetools_core::formats::{classify, targets_for, Category, Classification};
//!
//! assert_eq!(classify("PNG"), Classification::Known(Category::Image));
//! assert_eq!(targets_for(Category::Image, "jpg"), vec!["png", "gif", "bmp"]);
//! ```

mod registry;
mod types;

pub use registry::{
    all_extensions, classify, classify_path, extension_of, extensions_for, normalize_extension,
    picker_filters, targets_for, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use types::{Category, Classification, FileFilter};
