//! Screen flow for converting files and downloading videos.
//!
//! The [`NavigationController`] owns exactly one [`Screen`] at a time. Each
//! step consumes the current screen, asks the [`Presenter`] for a
//! [`UserAction`], and produces the next screen:
//!
//! ```text
//! Welcome ─┬─> PickFile ─> PickTargetFormat ─> ConfirmConversion ─> (convert) ─> Welcome
//!          └─> EnterLink ─> LinkPreview ─> Downloading ─> EnterLink
//! ```
//!
//! Conversions and downloads run while the presenter stays live, so a
//! `Cancel` action aborts the running operation.

mod controller;
mod presenter;
mod screen;

pub use controller::{NavigationController, Transition};
pub use presenter::{Notice, NoticeLevel, Presenter, UserAction};
pub use screen::{LinkPreview, Screen, ScreenKind};
