mod delivery;
mod pages;
mod routes;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use reqwest::Client as ReqwestClient;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::AppConfig,
    downloader::{DownloadContext, Platform, SpotifyAccess},
    extractor::MediaExtractor,
};

/// Per-process state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<dyn MediaExtractor>,
    pub http: ReqwestClient,
}
impl AppState {
    pub fn new(config: AppConfig, engine: Arc<dyn MediaExtractor>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            http: ReqwestClient::new(),
        }
    }

    pub fn download_context(&self) -> DownloadContext<'_> {
        DownloadContext {
            download_dir: &self.config.download_dir,
            engine: self.engine.as_ref(),
            http: &self.http,
            spotify: self.config.spotify.as_ref().map(|credentials| SpotifyAccess {
                credentials,
                endpoints: &self.config.spotify_endpoints,
            }),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/download", post(routes::download))
        .route("/downloads/:filename", get(delivery::serve_download))
        .route("/downloads/music/:filename", get(delivery::serve_music_download));

    for platform in Platform::ALL {
        router = router.route(
            &format!("/{}", platform.slug()),
            get(move || routes::platform_page(platform)),
        );
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening for requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
