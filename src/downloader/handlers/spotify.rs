use std::path::{Path, PathBuf};

use reqwest::Client as ReqwestClient;
use tracing::{debug, info, trace, warn};

use super::Handler;
use crate::{
    downloader::{DownloadContext, DownloadOutcome, DownloadRequest, Platform},
    error::DownloadError,
    extractor::{AudioExtraction, ExtractRequest, MediaExtractor},
    helpers::{
        download::download_bytes,
        sanitize::sanitize_filename_component,
        tagger::{self, TrackTags},
    },
    spotify::{SpotifyClient, SpotifyReference, TrackRecord},
};

const AUDIO_SELECTOR: &str = "bestaudio/best";
const AUDIO_BITRATE_KBPS: u16 = 320;

#[derive(Debug)]
pub struct SpotifyProvider;

#[async_trait::async_trait]
impl Handler for SpotifyProvider {
    fn platform(&self) -> Platform {
        Platform::Spotify
    }

    fn domains(&self) -> &'static [&'static str] {
        &["spotify.com"]
    }

    #[tracing::instrument(skip_all, fields(url = %request.url))]
    async fn download(
        &self,
        ctx: &DownloadContext<'_>,
        request: &DownloadRequest,
    ) -> Result<DownloadOutcome, DownloadError> {
        let Some(access) = ctx.spotify else {
            return Err(DownloadError::MissingCredentials);
        };

        let Some(reference) = SpotifyReference::parse(request.url.as_str()) else {
            return Err(DownloadError::invalid_input("Invalid Spotify URL."));
        };
        debug!(%reference, "Resolving Spotify reference");

        let client = SpotifyClient::authenticate(ctx.http, access.endpoints, access.credentials)
            .await
            .map_err(|e| DownloadError::Auth {
                message: format!("{e:#}"),
            })?;

        let tracks = client
            .resolve(&reference)
            .await
            .map_err(|e| DownloadError::Upstream {
                platform: Platform::Spotify,
                message: format!("Error fetching Spotify tracks: {e:#}"),
            })?;
        info!(count = tracks.len(), "Resolved Spotify tracks");

        let music_dir = ctx.download_dir.join(crate::downloader::MUSIC_SUBDIR);
        tokio::fs::create_dir_all(&music_dir).await?;

        let outcome = Self::download_tracks(ctx.engine, ctx.http, &music_dir, &tracks).await;

        if outcome.files.is_empty() {
            return Err(DownloadError::EmptyBatch {
                platform: Platform::Spotify,
                attempted: tracks.len(),
            });
        }

        Ok(outcome)
    }
}

impl SpotifyProvider {
    /// Tracks are fetched one after another. A failing track is logged and
    /// skipped, never failing the batch.
    pub async fn download_tracks(
        engine: &dyn MediaExtractor,
        http: &ReqwestClient,
        music_dir: &Path,
        tracks: &[TrackRecord],
    ) -> DownloadOutcome {
        let mut outcome = DownloadOutcome::default();

        for track in tracks {
            let Some(artist) = track.artist.as_deref() else {
                warn!(track = %track.name, "Track has no artist, skipping");
                outcome.skipped.push(track.name.clone());
                continue;
            };

            match Self::download_track(engine, music_dir, &track.name, artist).await {
                Ok(file) => {
                    Self::embed_metadata(http, &file, track, artist).await;
                    outcome.files.push(file);
                }
                Err(e) => {
                    warn!(track = %track.name, error = %format!("{e:#}"), "Error downloading track");
                    outcome.skipped.push(track.name.clone());
                }
            }
        }

        outcome
    }

    pub fn track_file_stem(track_name: &str, artist: &str) -> String {
        format!(
            "{} - {}",
            sanitize_filename_component(artist),
            sanitize_filename_component(track_name)
        )
    }

    pub fn search_query(track_name: &str, artist: &str) -> String {
        format!("ytsearch:{track_name} {artist} audio")
    }

    #[tracing::instrument(skip(engine, music_dir))]
    async fn download_track(
        engine: &dyn MediaExtractor,
        music_dir: &Path,
        track_name: &str,
        artist: &str,
    ) -> anyhow::Result<PathBuf> {
        let audio = AudioExtraction::mp3(AUDIO_BITRATE_KBPS);
        let stem = Self::track_file_stem(track_name, artist);

        let extract = ExtractRequest::new(
            Self::search_query(track_name, artist),
            music_dir.join(format!("{stem}.%(ext)s")),
            AUDIO_SELECTOR,
        )
        .extract_audio(audio)
        .no_playlist();
        trace!(?extract, "Searching for track audio");

        engine.extract(&extract).await?;

        Ok(music_dir.join(format!("{stem}.{}", audio.codec)))
    }

    /// Tags are best-effort; failures are only logged.
    async fn embed_metadata(http: &ReqwestClient, file: &Path, track: &TrackRecord, artist: &str) {
        if !tokio::fs::try_exists(file).await.unwrap_or(false) {
            trace!(?file, "Downloaded file not found, not tagging");
            return;
        }

        let cover = match track.cover_url.as_deref() {
            Some(cover_url) => match download_bytes(http, cover_url).await {
                Ok(cover) => Some(cover),
                Err(e) => {
                    warn!(track = %track.name, error = %format!("{e:#}"), "Error fetching cover art");
                    None
                }
            },
            None => None,
        };

        let res: anyhow::Result<()> = {
            let file = file.to_path_buf();
            let title = track.name.clone();
            let artist = artist.to_string();
            let album = track.album.clone();

            tokio::task::spawn_blocking(move || {
                tagger::write_tags(
                    &file,
                    &TrackTags {
                        title: &title,
                        artist: &artist,
                        album: album.as_deref(),
                        cover: cover.as_deref(),
                    },
                )
            })
            .await
            .map_err(anyhow::Error::from)
            .and_then(|x| x)
        };

        match res {
            Ok(()) => debug!(?file, "Embedded tags"),
            Err(e) => warn!(track = %track.name, error = %format!("{e:#}"), "Error embedding metadata"),
        }
    }
}
