mod handlers;

use std::{
    fmt::Display,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

pub use handlers::youtube::QUALITY_LABELS;
use handlers::HANDLERS;
use reqwest::Client as ReqwestClient;
use tracing::info;
use url::Url;

use crate::{
    config::{SpotifyCredentials, SpotifyEndpoints},
    error::DownloadError,
    extractor::MediaExtractor,
};

/// Subdirectory of the download directory that holds Spotify tracks.
pub const MUSIC_SUBDIR: &str = "music";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Youtube,
    Instagram,
    Tiktok,
    Twitter,
    Spotify,
}
impl Platform {
    pub const ALL: [Self; 5] = [
        Self::Youtube,
        Self::Instagram,
        Self::Tiktok,
        Self::Twitter,
        Self::Spotify,
    ];

    /// Form value and URL path segment.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Spotify => "spotify",
        }
    }
}
impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Youtube => f.write_str("YouTube"),
            Self::Instagram => f.write_str("Instagram"),
            Self::Tiktok => f.write_str("TikTok"),
            Self::Twitter => f.write_str("Twitter"),
            Self::Spotify => f.write_str("Spotify"),
        }
    }
}
impl FromStr for Platform {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Self::ALL
            .into_iter()
            .find(|x| x.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| DownloadError::invalid_input("Invalid platform selected."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    #[default]
    Mp4,
    Mp3,
}
impl MediaFormat {
    /// Anything other than `mp3` is treated as a video request.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("mp3") {
            Self::Mp3
        } else {
            Self::Mp4
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub platform: Platform,
    pub url: Url,
    pub format: MediaFormat,
    pub quality: String,
}
impl DownloadRequest {
    pub fn parse(
        platform: &str,
        url: &str,
        format: Option<&str>,
        quality: Option<&str>,
    ) -> Result<Self, DownloadError> {
        let platform = platform.parse::<Platform>()?;

        let url = Url::parse(url.trim())
            .map_err(|_| DownloadError::invalid_input("Could not parse the submitted URL."))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_input(
                "Only http and https URLs are supported.",
            ));
        }

        Ok(Self {
            platform,
            url,
            format: format.map(MediaFormat::from_label).unwrap_or_default(),
            quality: quality
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .unwrap_or("highest")
                .to_string(),
        })
    }
}

/// Files written by one download, plus Spotify tracks that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<String>,
}
impl DownloadOutcome {
    pub fn single(file: PathBuf) -> Self {
        Self {
            files: vec![file],
            skipped: Vec::new(),
        }
    }

    /// Paths relative to `base`, `/`-separated, as used by the delivery routes.
    pub fn relative_names(&self, base: &Path) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|file| {
                let rel = file.strip_prefix(base).unwrap_or(file);
                let parts = rel
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(x) => Some(x.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect::<Vec<_>>();

                match parts.as_slice() {
                    [] => None,
                    [dir, name] if dir == MUSIC_SUBDIR => Some(format!("{dir}/{name}")),
                    [.., name] => Some(name.clone()),
                }
            })
            .collect()
    }
}

/// Configured Spotify credentials and the endpoints they are used against.
#[derive(Debug, Clone, Copy)]
pub struct SpotifyAccess<'a> {
    pub credentials: &'a SpotifyCredentials,
    pub endpoints: &'a SpotifyEndpoints,
}

/// Everything a handler may touch for one request.
#[derive(Debug, Clone, Copy)]
pub struct DownloadContext<'a> {
    pub download_dir: &'a Path,
    pub engine: &'a dyn MediaExtractor,
    pub http: &'a ReqwestClient,
    pub spotify: Option<SpotifyAccess<'a>>,
}

pub struct Downloader;
impl Downloader {
    #[tracing::instrument(skip_all, fields(platform = %request.platform, url = %request.url))]
    pub async fn download(
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        info!("Downloading media...");

        let Some(handler) = HANDLERS.iter().find(|x| x.platform() == request.platform) else {
            return Err(DownloadError::invalid_input("Invalid platform selected."));
        };

        if !handler.supports(&request.url) {
            return Err(DownloadError::invalid_input(format!(
                "The URL does not look like a {} link.",
                request.platform
            )));
        }

        let outcome = handler.download(ctx, request).await?;

        info!(
            files = outcome.files.len(),
            skipped = outcome.skipped.len(),
            "Download finished"
        );

        Ok(outcome)
    }
}
