use tracing::{debug, trace};

use super::Handler;
use crate::{
    downloader::{DownloadContext, DownloadOutcome, DownloadRequest, Platform},
    error::DownloadError,
    extractor::ExtractRequest,
};

pub(super) const MP4_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]";

#[derive(Debug)]
pub struct TwitterProvider;

#[async_trait::async_trait]
impl Handler for TwitterProvider {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn domains(&self) -> &'static [&'static str] {
        &["twitter.com", "x.com"]
    }

    #[tracing::instrument(skip_all, fields(url = %request.url))]
    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        let extract = ExtractRequest::new(
            request.url.as_str(),
            ctx.download_dir.join("%(title)s.%(ext)s"),
            MP4_SELECTOR,
        );
        trace!(?extract, "Built extraction request");

        let info = ctx
            .engine
            .extract(&extract)
            .await
            .map_err(|e| DownloadError::upstream(Platform::Twitter, &e))?;

        debug!(file = ?info.filename, "Tweet media downloaded");

        Ok(DownloadOutcome::single(info.filename))
    }
}
