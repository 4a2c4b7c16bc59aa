mod ytdlp;

use std::path::PathBuf;

use serde::Deserialize;
pub use ytdlp::YtDlp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: &'static str,
    pub bitrate_kbps: u16,
}
impl AudioExtraction {
    pub const fn mp3(bitrate_kbps: u16) -> Self {
        Self {
            codec: "mp3",
            bitrate_kbps,
        }
    }
}

/// One invocation of the extraction engine.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub url: String,
    /// Engine output template, e.g. `dir/%(title)s.%(ext)s`.
    pub output_template: PathBuf,
    pub format: String,
    pub audio: Option<AudioExtraction>,
    pub no_playlist: bool,
    pub first_item_only: bool,
    pub write_thumbnail: bool,
}
impl ExtractRequest {
    pub fn new<U, T, F>(url: U, output_template: T, format: F) -> Self
    where
        U: Into<String>,
        T: Into<PathBuf>,
        F: Into<String>,
    {
        Self {
            url: url.into(),
            output_template: output_template.into(),
            format: format.into(),
            audio: None,
            no_playlist: false,
            first_item_only: false,
            write_thumbnail: false,
        }
    }

    #[must_use]
    pub fn extract_audio(mut self, audio: AudioExtraction) -> Self {
        self.audio = Some(audio);
        self
    }

    #[must_use]
    pub fn no_playlist(mut self) -> Self {
        self.no_playlist = true;
        self
    }

    #[must_use]
    pub fn first_item_only(mut self) -> Self {
        self.first_item_only = true;
        self
    }

    #[must_use]
    pub fn write_thumbnail(mut self) -> Self {
        self.write_thumbnail = true;
        self
    }
}

/// What the engine reports about the media it just fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub ext: String,
    /// Path the engine wrote before any post-processing.
    #[serde(rename = "_filename")]
    pub filename: PathBuf,
}

#[async_trait::async_trait]
pub trait MediaExtractor: std::fmt::Debug + Send + Sync {
    async fn extract(&self, request: &ExtractRequest) -> anyhow::Result<MediaInfo>;
}
