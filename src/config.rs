use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::Context;

pub use crate::spotify::SpotifyEndpoints;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DOWNLOAD_DIR: &str = "server_downloads";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub download_dir: PathBuf,
    pub ytdlp_path: PathBuf,
    /// `None` when either half of the credentials is missing.
    pub spotify: Option<SpotifyCredentials>,
    pub spotify_endpoints: SpotifyEndpoints,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|x| !x.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {p:?}"))?,
            None => DEFAULT_PORT,
        };

        let bind_address = match non_empty("BIND_ADDRESS") {
            Some(a) => a
                .trim()
                .parse()
                .with_context(|| format!("Invalid BIND_ADDRESS value: {a:?}"))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let spotify = match (
            non_empty("SPOTIFY_CLIENT_ID"),
            non_empty("SPOTIFY_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let default_endpoints = SpotifyEndpoints::default();
        let spotify_endpoints = SpotifyEndpoints {
            token_url: non_empty("SPOTIFY_TOKEN_URL").unwrap_or(default_endpoints.token_url),
            api_base: non_empty("SPOTIFY_API_BASE").unwrap_or(default_endpoints.api_base),
        };

        Ok(Self {
            bind_address,
            port,
            download_dir: non_empty("DOWNLOAD_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR), PathBuf::from),
            ytdlp_path: non_empty("YTDLP_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_YTDLP_PATH), PathBuf::from),
            spotify,
            spotify_endpoints,
        })
    }

    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn music_dir(&self) -> PathBuf {
        self.download_dir.join(crate::downloader::MUSIC_SUBDIR)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();

        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).expect("empty environment should be valid");

        assert_eq!(config.port, 8000);
        assert_eq!(config.download_dir, PathBuf::from("server_downloads"));
        assert_eq!(config.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8000");
        assert!(config.spotify.is_none());
        assert_eq!(config.spotify_endpoints, SpotifyEndpoints::default());
        assert!(config.spotify_endpoints.token_url.starts_with("https://accounts.spotify.com/"));
    }

    #[test]
    fn spotify_endpoints_can_be_redirected() {
        let config = config_from(&[
            ("SPOTIFY_TOKEN_URL", "http://127.0.0.1:9000/api/token"),
            ("SPOTIFY_API_BASE", "http://127.0.0.1:9000/v1"),
        ])
        .expect("valid config");

        assert_eq!(config.spotify_endpoints.token_url, "http://127.0.0.1:9000/api/token");
        assert_eq!(config.spotify_endpoints.api_base, "http://127.0.0.1:9000/v1");
    }

    #[test]
    fn spotify_credentials_need_both_halves() {
        let config = config_from(&[("SPOTIFY_CLIENT_ID", "abc")]).expect("valid config");
        assert!(config.spotify.is_none());

        let config = config_from(&[("SPOTIFY_CLIENT_ID", "abc"), ("SPOTIFY_CLIENT_SECRET", "  ")])
            .expect("valid config");
        assert!(config.spotify.is_none());

        let config = config_from(&[("SPOTIFY_CLIENT_ID", "abc"), ("SPOTIFY_CLIENT_SECRET", "xyz")])
            .expect("valid config");
        let creds = config.spotify.expect("credentials should be set");
        assert_eq!(creds.client_id, "abc");
        assert_eq!(creds.client_secret, "xyz");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).expect_err("port should not parse");
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("DOWNLOAD_DIR", "/srv/media"),
            ("YTDLP_PATH", "/opt/bin/yt-dlp"),
        ])
        .expect("valid config");

        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(config.music_dir(), PathBuf::from("/srv/media/music"));
        assert_eq!(config.ytdlp_path, PathBuf::from("/opt/bin/yt-dlp"));
    }
}
