use std::path::{Component, Path as FsPath};

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue},
    response::Response,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower::util::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, trace};

use super::AppState;
use crate::error::DownloadError;

/// Characters left alone when a filename goes into a URL or header.
pub(super) const FILENAME_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

pub async fn serve_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> Result<Response, DownloadError> {
    serve_file(&state.config.download_dir, &filename, req).await
}

pub async fn serve_music_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> Result<Response, DownloadError> {
    serve_file(&state.config.music_dir(), &filename, req).await
}

#[tracing::instrument(skip(req))]
async fn serve_file(dir: &FsPath, filename: &str, req: Request) -> Result<Response, DownloadError> {
    if !is_plain_filename(filename) {
        return Err(DownloadError::invalid_input("Invalid file name."));
    }

    let path = dir.join(filename);
    trace!(?path, "Serving file");

    let mut res = ServeFile::new(&path)
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {});

    if res.status().is_success() {
        if let Ok(value) = attachment_header(filename) {
            res.headers_mut().insert(header::CONTENT_DISPOSITION, value);
        }
    }

    debug!(status = %res.status(), "File request handled");

    Ok(res.map(Body::new))
}

/// A single normal path component, so lookups never leave the directory.
fn is_plain_filename(filename: &str) -> bool {
    if filename.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = FsPath::new(filename).components();

    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn attachment_header(filename: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
    let fallback = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let encoded = utf8_percent_encode(filename, FILENAME_ENCODE_SET);

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_filenames_are_accepted() {
        for name in ["clip.mp4", "Queen - Bohemian_Rhapsody.mp3", "tiktok_1_2-3.mp4", "아이유.mp3"] {
            assert!(is_plain_filename(name), "{name}");
        }
    }

    #[test]
    fn traversal_attempts_are_rejected() {
        for name in ["", ".", "..", "../etc/passwd", "music/x.mp3", "/etc/passwd", "a\\b", "x\0y"] {
            assert!(!is_plain_filename(name), "{name:?}");
        }
    }

    #[test]
    fn attachment_header_escapes_non_ascii() {
        let value = attachment_header("Sigur Rós \"live\".mp3").expect("valid header");
        let value = value.to_str().expect("ascii header");

        assert_eq!(
            value,
            "attachment; filename=\"Sigur R_s _live_.mp3\"; filename*=UTF-8''Sigur%20R%C3%B3s%20%22live%22.mp3"
        );
    }
}
