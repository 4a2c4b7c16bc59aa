use std::path::PathBuf;

use tracing::{debug, trace};

use super::Handler;
use crate::{
    downloader::{DownloadContext, DownloadOutcome, DownloadRequest, MediaFormat, Platform},
    error::DownloadError,
    extractor::{AudioExtraction, ExtractRequest},
};

const BEST_SELECTOR: &str = "bestvideo+bestaudio/best";
const AUDIO_SELECTOR: &str = "bestaudio/best";
const AUDIO_BITRATE_KBPS: u16 = 192;
const QUALITY_MAP: &[(&str, &str)] = &[
    ("highest", BEST_SELECTOR),
    (
        "1080p",
        "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
    ),
    ("720p", "bestvideo[height<=720]+bestaudio/best[height<=720]"),
    ("480p", "bestvideo[height<=480]+bestaudio/best[height<=480]"),
    ("audio only", AUDIO_SELECTOR),
];

/// Quality labels offered on the form, in display order.
pub const QUALITY_LABELS: &[&str] = &["Highest", "1080p", "720p", "480p", "Audio Only"];

#[derive(Debug)]
pub struct YoutubeProvider;

#[async_trait::async_trait]
impl Handler for YoutubeProvider {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn domains(&self) -> &'static [&'static str] {
        &["youtube.com", "youtu.be"]
    }

    #[tracing::instrument(skip_all, fields(url = %request.url, format = ?request.format, quality = %request.quality))]
    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        let extract = Self::extract_request(ctx, request);
        trace!(?extract, "Built extraction request");

        let info = ctx
            .engine
            .extract(&extract)
            .await
            .map_err(|e| DownloadError::upstream(Platform::Youtube, &e))?;

        let file = Self::final_path(info.filename, extract.audio);
        debug!(?file, title = ?info.title, "Video downloaded");

        Ok(DownloadOutcome::single(file))
    }
}

impl YoutubeProvider {
    pub fn format_selector(quality: &str) -> &'static str {
        let quality = quality.trim();

        QUALITY_MAP
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(quality))
            .map_or(BEST_SELECTOR, |(_, selector)| *selector)
    }

    fn extract_request(ctx: &DownloadContext<'_>, request: &DownloadRequest) -> ExtractRequest {
        let template = ctx.download_dir.join("%(title)s.%(ext)s");

        match request.format {
            MediaFormat::Mp3 => ExtractRequest::new(request.url.as_str(), template, AUDIO_SELECTOR)
                .extract_audio(AudioExtraction::mp3(AUDIO_BITRATE_KBPS)),
            MediaFormat::Mp4 => ExtractRequest::new(
                request.url.as_str(),
                template,
                Self::format_selector(&request.quality),
            ),
        }
        .first_item_only()
    }

    /// The engine reports its pre-conversion name; audio extraction swaps the extension.
    fn final_path(engine_filename: PathBuf, audio: Option<AudioExtraction>) -> PathBuf {
        match audio {
            Some(audio) => engine_filename.with_extension(audio.codec),
            None => engine_filename,
        }
    }
}
