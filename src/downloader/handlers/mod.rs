pub(super) mod instagram;
pub(super) mod spotify;
pub(super) mod tiktok;
pub(super) mod twitter;
pub(super) mod youtube;

use once_cell::sync::Lazy;
use url::Url;

use super::{DownloadContext, DownloadOutcome, DownloadRequest, Platform};
use crate::{error::DownloadError, helpers::domain::DomainParser};

pub static HANDLERS: Lazy<Vec<DownloadHandler>> = Lazy::new(|| {
    vec![
        DownloadHandler::new(youtube::YoutubeProvider),
        DownloadHandler::new(instagram::InstagramProvider),
        DownloadHandler::new(tiktok::TiktokProvider),
        DownloadHandler::new(twitter::TwitterProvider),
        DownloadHandler::new(spotify::SpotifyProvider),
    ]
});

#[derive(Debug)]
pub struct DownloadHandler {
    provider: Box<dyn Handler>,
}
impl DownloadHandler {
    fn new<T>(provider: T) -> Self
    where
        T: Handler + 'static,
    {
        Self {
            provider: Box::new(provider),
        }
    }

    pub fn platform(&self) -> Platform {
        self.provider.platform()
    }

    pub fn supports(&self, url: &Url) -> bool {
        DomainParser::is_root_one_of(url, self.provider.domains())
    }

    pub async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        self.provider.download(ctx, request).await
    }
}

#[async_trait::async_trait]
pub trait Handler: std::fmt::Debug + Send + Sync {
    fn platform(&self) -> Platform;

    /// Registrable domains this platform's links live on.
    fn domains(&self) -> &'static [&'static str];

    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError>;
}
