pub mod config;
pub mod converter;
pub mod formats;
pub mod navigation;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use converter::{
    CollisionPolicy, ConverterConfig, FfmpegTranscoder, ImageConvertError, ImageConverter,
    TranscodeError, Transcoder,
};
pub use formats::{classify, classify_path, picker_filters, targets_for, Category, Classification};
pub use navigation::{
    LinkPreview, NavigationController, Notice, NoticeLevel, Presenter, Screen, ScreenKind,
    Transition, UserAction,
};
pub use orchestrator::{
    ConversionRequest, OperationOutcome, SourceFile, TaskError, TaskErrorKind, TaskOrchestrator,
    Thumbnail,
};
pub use progress::TaskProgress;
pub use resolver::{
    DownloadRequest, DownloadResult, MediaResolver, ResolverConfig, ResolverError, VideoMetadata,
    YtDlpResolver,
};
