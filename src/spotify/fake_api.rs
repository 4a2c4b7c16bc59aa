//! Local stand-in for the Spotify token and metadata endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::SpotifyEndpoints;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const PLAYLIST_ID: &str = "37i9dQZF1DXcBWIGoYBM5M";
pub const UNKNOWN_ID: &str = "missing";

/// `(track, artist)` pairs the playlist resolves to, in order.
pub const PLAYLIST_TRACKS: [(&str, &str); 3] = [
    ("First Song", "Artist One"),
    ("Second Song", "Artist Two"),
    ("Third Song", "Artist Three"),
];

const COVER_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

#[derive(Debug, Clone)]
struct FakeState {
    base: String,
    accept_credentials: bool,
}

#[derive(Debug, Deserialize)]
struct TokenForm {
    grant_type: String,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    offset: Option<usize>,
}

/// Serves the fake API on an ephemeral local port.
pub async fn spawn(accept_credentials: bool) -> SpotifyEndpoints {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake api");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));

    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/tracks/:id", get(track))
        .route("/v1/playlists/:id/tracks", get(playlist_tracks))
        .route("/cover.jpg", get(cover))
        .with_state(FakeState {
            base: base.clone(),
            accept_credentials,
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake api server");
    });

    SpotifyEndpoints {
        token_url: format!("{base}/api/token"),
        api_base: format!("{base}/v1"),
    }
}

async fn token(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    let basic_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .is_some_and(|x| x.starts_with("Basic "));

    if !state.accept_credentials || !basic_auth || form.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

async fn track(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == UNKNOWN_ID {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(track_json(&state.base, &format!("Song {id}"), Some("Solo Artist"))).into_response()
}

async fn playlist_tracks(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != PLAYLIST_ID {
        return StatusCode::NOT_FOUND.into_response();
    }

    let [first, second, third] = PLAYLIST_TRACKS;
    let page = match page.offset.unwrap_or(0) {
        0 => json!({
            "items": [
                { "track": track_json(&state.base, first.0, Some(first.1)) },
                { "track": null },
                { "track": track_json(&state.base, second.0, Some(second.1)) },
            ],
            "next": format!("{}/v1/playlists/{id}/tracks?offset=3&limit=100", state.base),
        }),
        _ => json!({
            "items": [
                { "track": track_json(&state.base, third.0, Some(third.1)) },
            ],
            "next": null,
        }),
    };

    Json(page).into_response()
}

async fn cover() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/jpeg")], COVER_BYTES)
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .is_some_and(|x| x == format!("Bearer {ACCESS_TOKEN}"))
}

fn track_json(base: &str, name: &str, artist: Option<&str>) -> Value {
    let artists = artist.map_or_else(|| json!([]), |x| json!([{ "name": x }]));

    json!({
        "name": name,
        "artists": artists,
        "album": {
            "name": "Fake Album",
            "images": [{ "url": format!("{base}/cover.jpg"), "height": 640, "width": 640 }],
        },
    })
}
