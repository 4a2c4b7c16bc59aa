use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, trace};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches a small remote resource (cover art) into memory.
#[tracing::instrument(skip(client))]
pub async fn download_bytes(client: &Client, download_url: &str) -> anyhow::Result<Vec<u8>> {
    let resp = get_file_response(client, download_url).await?;

    let bytes = resp.bytes().await?;
    trace!(len = bytes.len(), "Response body read");

    Ok(bytes.to_vec())
}

async fn get_file_response(client: &Client, download_url: &str) -> anyhow::Result<Response> {
    debug!("Starting download");
    client
        .get(download_url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!(e))
}
