use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{pages, AppState};
use crate::{
    downloader::{DownloadRequest, Downloader, Platform},
    error::DownloadError,
};

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    platform: String,
    #[serde(default)]
    url: String,
    format: Option<String>,
    quality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    module: &'static str,
    version: &'static str,
}

pub async fn index() -> Html<String> {
    Html(pages::index())
}

pub async fn platform_page(platform: Platform) -> Html<String> {
    Html(pages::platform_form(platform))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tracing::instrument(skip_all, fields(platform = %form.platform, url = %form.url))]
pub async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Result<Html<String>, DownloadError> {
    // Missing credentials win over anything wrong with the URL.
    let platform = form.platform.parse::<Platform>()?;
    if platform == Platform::Spotify && state.config.spotify.is_none() {
        return Err(DownloadError::MissingCredentials);
    }

    let request = DownloadRequest::parse(
        &form.platform,
        &form.url,
        form.format.as_deref(),
        form.quality.as_deref(),
    )?;

    let outcome = Downloader::download(&state.download_context(), &request).await?;

    let names = outcome.relative_names(&state.config.download_dir);
    for name in &names {
        info!(filename = %name, "Filename for download link");
    }

    Ok(Html(pages::download_success(
        request.platform,
        &names,
        &outcome.skipped,
    )))
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredentials => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth { .. } | Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::EmptyBatch { attempted, .. } => {
                debug!(attempted, "Every track in the batch failed");
                StatusCode::BAD_GATEWAY
            }
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_user_error() {
            debug!(error = %self, "Rejected request");
        } else {
            warn!(error = %self, "Request failed");
        }

        (status, Html(pages::error_page(&self.to_string()))).into_response()
    }
}
