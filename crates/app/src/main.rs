mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filetools_core::{
    load_config_or_default, validate_config, FfmpegTranscoder, NavigationController,
    TaskOrchestrator, Transcoder,
};

use terminal::TerminalPresenter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so they don't interleave with the screens
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine config path
    let config_path = std::env::var("NTFT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("ntft.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("ffmpeg: {:?}", config.converter.ffmpeg_path);
    info!("yt-dlp: {:?}", config.resolver.ytdlp_path);
    info!("Collision policy: {:?}", config.converter.collision_policy);

    // Missing tools only disable their feature
    if let Err(e) = FfmpegTranscoder::new(config.converter.clone()).validate().await {
        warn!("Video conversion will fail: {}", e);
    }

    let orchestrator = Arc::new(TaskOrchestrator::from_config(&config));
    let presenter = Arc::new(TerminalPresenter::new());
    let controller = NavigationController::new(orchestrator, presenter);

    tokio::select! {
        _ = controller.run() => {}
        _ = signal::ctrl_c() => {
            // Dropping the controller stops any running ffmpeg or yt-dlp
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
