use tracing::{debug, trace};
use uuid::Uuid;

use super::{twitter::MP4_SELECTOR, Handler};
use crate::{
    downloader::{DownloadContext, DownloadOutcome, DownloadRequest, Platform},
    error::DownloadError,
    extractor::ExtractRequest,
};

#[derive(Debug)]
pub struct TiktokProvider;

#[async_trait::async_trait]
impl Handler for TiktokProvider {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    fn domains(&self) -> &'static [&'static str] {
        &["tiktok.com"]
    }

    #[tracing::instrument(skip_all, fields(url = %request.url))]
    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        // Unique per request so parallel downloads of the same video do not clobber each other.
        let template = ctx
            .download_dir
            .join(format!("tiktok_%(id)s_{}.%(ext)s", Uuid::new_v4().simple()));

        let extract = ExtractRequest::new(request.url.as_str(), template, MP4_SELECTOR);
        trace!(?extract, "Built extraction request");

        let info = ctx
            .engine
            .extract(&extract)
            .await
            .map_err(|e| DownloadError::upstream(Platform::Tiktok, &e))?;

        debug!(file = ?info.filename, "Video downloaded");

        Ok(DownloadOutcome::single(info.filename))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client as ReqwestClient;

    use super::*;
    use crate::extractor::stub::{StubExtractor, STUB_ID};

    const VIDEO_URL: &str = "https://www.tiktok.com/@user/video/7300000000000000000";

    #[tokio::test]
    async fn repeated_downloads_get_distinct_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let engine = StubExtractor::with_ext("mp4");
        let http = ReqwestClient::new();
        let ctx = DownloadContext {
            download_dir: dir.path(),
            engine: &engine,
            http: &http,
            spotify: None,
        };
        let req = DownloadRequest::parse("tiktok", VIDEO_URL, None, None).expect("valid request");

        let first = TiktokProvider.download(&ctx, &req).await.expect("first download");
        let second = TiktokProvider.download(&ctx, &req).await.expect("second download");

        assert_ne!(first.files, second.files);

        for file in first.files.iter().chain(&second.files) {
            assert_eq!(file.parent(), Some(dir.path()));

            let name = file
                .file_name()
                .and_then(|x| x.to_str())
                .expect("utf-8 file name");
            let suffix = name
                .strip_prefix(&format!("tiktok_{STUB_ID}_"))
                .and_then(|x| x.strip_suffix(".mp4"))
                .expect("tiktok_<id>_<suffix>.mp4");
            assert_eq!(suffix.len(), 32, "{name}");
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()), "{name}");
            assert!(
                std::path::Path::new(name)
                    .extension()
                    .is_some_and(|x| x.eq_ignore_ascii_case("mp4")),
                "{name}"
            );
        }
    }
}
