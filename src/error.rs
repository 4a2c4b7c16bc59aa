use crate::downloader::Platform;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Spotify API credentials not configured.")]
    MissingCredentials,

    #[error("Spotify authentication failed: {message}")]
    Auth { message: String },

    #[error("{platform} Download Error: {message}")]
    Upstream { platform: Platform, message: String },

    /// Every track of a batch failed, so there is nothing to deliver.
    #[error("No {platform} tracks were downloaded.")]
    EmptyBatch { platform: Platform, attempted: usize },

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Wraps any upstream failure, keeping the full cause chain in the message.
    pub fn upstream(platform: Platform, err: &anyhow::Error) -> Self {
        Self::Upstream {
            platform,
            message: format!("{err:#}"),
        }
    }

    /// Whether the caller could fix the request and try again.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::MissingCredentials)
    }
}
