use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{ApiPlaylistPage, ApiTrack, SpotifyReference, TrackRecord};
use crate::config::SpotifyCredentials;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const PLAYLIST_PAGE_LIMIT: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Where the token and metadata requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyEndpoints {
    pub token_url: String,
    /// Versioned API root, without a trailing slash.
    pub api_base: String,
}
impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE.to_string(),
        }
    }
}

/// Metadata API client holding an app-level access token.
#[derive(Debug)]
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl SpotifyClient {
    /// Client-credentials flow; no user is involved.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(
        client: &Client,
        endpoints: &SpotifyEndpoints,
        credentials: &SpotifyCredentials,
    ) -> anyhow::Result<Self> {
        debug!(token_url = %endpoints.token_url, "Requesting Spotify access token");

        let resp = client
            .post(&endpoints.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Could not reach the Spotify token endpoint")?
            .error_for_status()
            .context("Spotify rejected the client credentials")?
            .json::<TokenResponse>()
            .await
            .context("Invalid Spotify token response")?;

        trace!("Got Spotify access token");

        Ok(Self {
            client: client.clone(),
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
            access_token: resp.access_token,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, reference: &SpotifyReference) -> anyhow::Result<Vec<TrackRecord>> {
        match reference {
            SpotifyReference::Track(id) => Ok(vec![self.track(id).await?]),
            SpotifyReference::Playlist(id) => self.playlist_tracks(id).await,
        }
    }

    async fn track(&self, id: &str) -> anyhow::Result<TrackRecord> {
        debug!("Fetching track");

        let track = self
            .get(&format!("{}/tracks/{id}", self.api_base))
            .await?
            .json::<ApiTrack>()
            .await?;

        Ok(track.into())
    }

    async fn playlist_tracks(&self, id: &str) -> anyhow::Result<Vec<TrackRecord>> {
        debug!("Fetching playlist tracks");

        let mut tracks = Vec::new();
        let mut page_url = Some(format!(
            "{}/playlists/{id}/tracks?limit={PLAYLIST_PAGE_LIMIT}",
            self.api_base
        ));

        while let Some(url) = page_url {
            let page = self.get(&url).await?.json::<ApiPlaylistPage>().await?;
            let (records, next) = page.into_records();

            trace!(count = records.len(), has_next = next.is_some(), "Got playlist page");

            tracks.extend(records);
            page_url = next;
        }

        debug!(count = tracks.len(), "Playlist resolved");

        Ok(tracks)
    }

    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        self.client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()
            .map_err(std::convert::Into::into)
    }
}
