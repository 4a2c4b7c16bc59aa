mod config;
mod downloader;
mod error;
mod extractor;
mod helpers;
mod server;
mod spotify;

use std::sync::Arc;

use config::AppConfig;
use extractor::YtDlp;
use server::AppState;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter::Builder as TracingFilterBuilder, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(e) if e.not_found() => {}
        Ok(_) => {}
        Err(e) => {
            panic!("Failed to load .env file: {}", e);
        }
    }

    init_log();

    info!("Starting media downloader...");

    let config = AppConfig::from_env()?;

    tokio::fs::create_dir_all(&config.download_dir).await?;
    info!(dir = ?config.download_dir, "Download directory ready");

    let engine = YtDlp::new(&config.ytdlp_path);
    match engine.version().await {
        Ok(version) => info!(%version, binary = ?engine.binary(), "Extraction engine found"),
        Err(e) => warn!(?e, binary = ?engine.binary(), "Extraction engine not available, downloads will fail"),
    }

    if config.spotify.is_none() {
        warn!("Spotify credentials not configured, Spotify downloads are disabled");
    }

    server::run(AppState::new(config, Arc::new(engine))).await
}

fn init_log() {
    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(
            TracingFilterBuilder::default()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .init();
}
