mod client;
#[cfg(test)]
pub mod fake_api;

use std::fmt::Display;

pub use client::{SpotifyClient, SpotifyEndpoints};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?<kind>track|playlist)/(?<id>[a-zA-Z0-9]+)").expect("Invalid regex")
});

/// What a Spotify URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyReference {
    Track(String),
    Playlist(String),
}
impl SpotifyReference {
    pub fn parse(url: &str) -> Option<Self> {
        let captures = REFERENCE_REGEX.captures(url)?;
        let id = captures.name("id")?.as_str().to_string();

        match captures.name("kind")?.as_str() {
            "track" => Some(Self::Track(id)),
            "playlist" => Some(Self::Playlist(id)),
            _ => None,
        }
    }
}
impl Display for SpotifyReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track(id) => write!(f, "track/{id}"),
            Self::Playlist(id) => write!(f, "playlist/{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: Option<ApiAlbum>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    name: String,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistPage {
    items: Vec<ApiPlaylistItem>,
    next: Option<String>,
}

impl From<ApiTrack> for TrackRecord {
    fn from(track: ApiTrack) -> Self {
        let (album, cover_url) = match track.album {
            Some(album) => (
                Some(album.name),
                album.images.into_iter().next().map(|x| x.url),
            ),
            None => (None, None),
        };

        Self {
            name: track.name,
            artist: track.artists.into_iter().next().map(|x| x.name),
            album,
            cover_url,
        }
    }
}

impl ApiPlaylistPage {
    fn into_records(self) -> (Vec<TrackRecord>, Option<String>) {
        let records = self
            .items
            .into_iter()
            .filter_map(|x| x.track)
            .map(TrackRecord::from)
            .collect();

        (records, self.next)
    }
}
