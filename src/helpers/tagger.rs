use std::path::Path;

use id3::{
    frame::{Picture, PictureType},
    Tag, TagLike, Version,
};

/// Tag values written into a downloaded track.
#[derive(Debug, Clone, Default)]
pub struct TrackTags<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: Option<&'a str>,
    pub cover: Option<&'a [u8]>,
}

/// Writes ID3v2.4 title/artist/album and the front cover into an mp3 file,
/// keeping any other frames already present.
pub fn write_tags(path: &Path, tags: &TrackTags<'_>) -> anyhow::Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Tag::new(),
        Err(e) => return Err(e.into()),
    };

    tag.set_title(tags.title);
    tag.set_artist(tags.artist);
    if let Some(album) = tags.album {
        tag.set_album(album);
    }

    if let Some(cover) = tags.cover {
        tag.remove_all_pictures();
        tag.add_frame(Picture {
            mime_type: detect_mime_type(cover).to_string(),
            picture_type: PictureType::CoverFront,
            description: "Cover".to_string(),
            data: cover.to_vec(),
        });
    }

    tag.write_to_path(path, Version::Id3v24)?;

    Ok(())
}

fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else {
        "image/jpeg"
    }
}
