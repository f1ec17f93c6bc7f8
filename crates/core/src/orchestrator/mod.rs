//! Task orchestration.
//!
//! Turns a confirmed user decision into a concrete operation:
//! - **Conversions** are routed by [`Category`](crate::formats::Category):
//!   images go to the in-process [`ImageConverter`](crate::converter::ImageConverter),
//!   videos to the [`Transcoder`](crate::converter::Transcoder).
//! - **Downloads** go to the [`MediaResolver`](crate::resolver::MediaResolver).
//!
//! Every error stops here. Callers always receive an [`OperationOutcome`].

mod dispatcher;
mod types;

pub use dispatcher::TaskOrchestrator;
pub use types::{
    ConversionRequest, OperationOutcome, SourceFile, TaskError, TaskErrorKind, Thumbnail,
};
