use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;
use tracing::{debug, trace};

use super::{ExtractRequest, MediaExtractor, MediaInfo};

/// Extraction engine backed by the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}
impl YtDlp {
    pub fn new<T: Into<PathBuf>>(binary: T) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    #[tracing::instrument(skip(self), fields(binary = ?self.binary))]
    pub async fn version(&self) -> anyhow::Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            anyhow::bail!("Command executed with exit code {:?}", output.status.code());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn build_args(request: &ExtractRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--no-simulate",
            "--dump-json",
            "--quiet",
            "--no-warnings",
            "--no-progress",
            "--no-check-certificates",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push("--format".into());
        args.push(request.format.clone().into());
        args.push("--output".into());
        args.push(request.output_template.clone().into_os_string());

        if request.no_playlist {
            args.push("--no-playlist".into());
        }

        if request.first_item_only {
            args.push("--playlist-items".into());
            args.push("1".into());
        }

        if request.write_thumbnail {
            args.push("--write-thumbnail".into());
        }

        if let Some(audio) = request.audio {
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(audio.codec.into());
            args.push("--audio-quality".into());
            args.push(format!("{}K", audio.bitrate_kbps).into());
        }

        args.push("--".into());
        args.push(request.url.clone().into());

        args
    }

    fn error_message(stderr: &[u8]) -> Option<String> {
        let stderr = String::from_utf8_lossy(stderr);

        stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|x| !x.is_empty())
            .map(|x| x.trim_start_matches("ERROR:").trim().to_string())
    }

    fn parse_info(stdout: &[u8]) -> anyhow::Result<MediaInfo> {
        let stdout = String::from_utf8_lossy(stdout);

        // Playlists print one object per entry; the first one wins.
        let Some(first) = stdout.lines().map(str::trim).find(|x| !x.is_empty()) else {
            anyhow::bail!("Engine produced no media information");
        };

        serde_json::from_str(first).map_err(std::convert::Into::into)
    }
}

#[async_trait::async_trait]
impl MediaExtractor for YtDlp {
    #[tracing::instrument(skip(self, request), fields(url = %request.url, format = %request.format))]
    async fn extract(&self, request: &ExtractRequest) -> anyhow::Result<MediaInfo> {
        debug!("Running extraction engine");

        let args = Self::build_args(request);
        trace!(?args, "Engine arguments");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        trace!(status = ?output.status, "Engine command finished");

        if !output.status.success() {
            let reason = Self::error_message(&output.stderr)
                .unwrap_or_else(|| format!("exit code {:?}", output.status.code()));
            anyhow::bail!(reason);
        }

        let info = Self::parse_info(&output.stdout)?;
        debug!(file = ?info.filename, "Media extracted");

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::AudioExtraction;

    fn args_as_strings(request: &ExtractRequest) -> Vec<String> {
        YtDlp::build_args(request)
            .into_iter()
            .map(|x| x.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn audio_requests_add_post_processing() {
        let request = ExtractRequest::new(
            "ytsearch:Song Artist audio",
            "music/Artist - Song.%(ext)s",
            "bestaudio/best",
        )
        .extract_audio(AudioExtraction::mp3(320));

        let args = args_as_strings(&request);

        let audio_at = args
            .iter()
            .position(|x| x == "--extract-audio")
            .expect("audio flag present");
        assert_eq!(
            &args[audio_at..audio_at + 5],
            ["--extract-audio", "--audio-format", "mp3", "--audio-quality", "320K"]
        );
        assert_eq!(args[args.len() - 2..], ["--", "ytsearch:Song Artist audio"]);
    }

    #[test]
    fn video_requests_skip_optional_flags() {
        let request = ExtractRequest::new("https://x.com/a/status/1", "dl/%(title)s.%(ext)s", "best");

        let args = args_as_strings(&request);

        assert!(args.contains(&"--no-check-certificates".to_string()));
        assert!(!args.contains(&"--extract-audio".to_string()));
        assert!(!args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--write-thumbnail".to_string()));

        let output_at = args
            .iter()
            .position(|x| x == "--output")
            .expect("output flag present");
        assert_eq!(args[output_at + 1], "dl/%(title)s.%(ext)s");
    }

    #[test]
    fn error_message_uses_last_stderr_line() {
        let stderr = b"WARNING: something odd\nERROR: [youtube] abc: Video unavailable\n\n";

        assert_eq!(
            YtDlp::error_message(stderr).as_deref(),
            Some("[youtube] abc: Video unavailable")
        );
        assert_eq!(YtDlp::error_message(b"  \n"), None);
    }

    #[test]
    fn first_json_line_is_used() {
        let stdout = concat!(
            r#"{"id":"a","title":"First","ext":"mp4","_filename":"d/First.mp4"}"#,
            "\n",
            r#"{"id":"b","title":"Second","ext":"mp4","_filename":"d/Second.mp4"}"#,
            "\n"
        );

        let info = YtDlp::parse_info(stdout.as_bytes()).expect("valid output");
        assert_eq!(info.id, "a");

        assert!(YtDlp::parse_info(b"\n").is_err());
    }
}
