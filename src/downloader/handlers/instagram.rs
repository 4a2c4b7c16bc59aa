use tracing::{debug, trace};

use super::Handler;
use crate::{
    downloader::{DownloadContext, DownloadOutcome, DownloadRequest, Platform},
    error::DownloadError,
    extractor::ExtractRequest,
};

const FORMAT_SELECTOR: &str = "bestvideo+bestaudio/best";

#[derive(Debug)]
pub struct InstagramProvider;

#[async_trait::async_trait]
impl Handler for InstagramProvider {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn domains(&self) -> &'static [&'static str] {
        &["instagram.com"]
    }

    #[tracing::instrument(skip_all, fields(url = %request.url))]
    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        // Named after the post ID. The thumbnail lands next to it and is not served.
        let extract = ExtractRequest::new(
            request.url.as_str(),
            ctx.download_dir.join("%(id)s.%(ext)s"),
            FORMAT_SELECTOR,
        )
        .no_playlist()
        .write_thumbnail();
        trace!(?extract, "Built extraction request");

        let info = ctx
            .engine
            .extract(&extract)
            .await
            .map_err(|e| DownloadError::upstream(Platform::Instagram, &e))?;

        let file = ctx.download_dir.join(format!("{}.{}", info.id, info.ext));

        if !tokio::fs::try_exists(&file).await.unwrap_or(false) {
            return Err(DownloadError::Upstream {
                platform: Platform::Instagram,
                message: "Media file not found after download.".to_string(),
            });
        }

        debug!(?file, "Post downloaded");

        Ok(DownloadOutcome::single(file))
    }
}
