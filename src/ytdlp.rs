use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::progress;
use crate::source::{ProgressFn, SourceError, VideoMeta, VideoSource};

/// yt-dlp-backed video source.
///
/// All platform interaction is delegated to the yt-dlp executable; this
/// type only builds argument lists and reads the line-delimited stdout
/// protocol (progress lines plus `--print` output).
pub struct YtDlpSource {
    ytdlp: PathBuf,
}

impl YtDlpSource {
    /// Locates yt-dlp on PATH.
    pub fn locate() -> Result<Self, SourceError> {
        let ytdlp = which::which("yt-dlp").map_err(|_| SourceError::ToolMissing("yt-dlp"))?;
        Ok(Self { ytdlp })
    }

    /// Runs yt-dlp, forwarding progress lines to `on_progress` and
    /// collecting every other stdout line.
    async fn run(
        &self,
        args: &[&str],
        on_progress: &ProgressFn,
    ) -> Result<Vec<String>, SourceError> {
        let mut child = Command::new(&self.ytdlp)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SourceError::ToolFailed("could not capture yt-dlp stdout".to_string())
        })?;
        let mut collected = Vec::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            debug!(target: "ytdlp", "{line}");
            match progress::parse_line(&line) {
                Some(fraction) => on_progress(fraction),
                None => collected.push(line),
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if stderr.contains("Requested format is not available") {
                return Err(SourceError::NoStream);
            }
            return Err(SourceError::ToolFailed(stderr));
        }
        Ok(collected)
    }

    /// Shared download path for the video and audio stream selectors.
    async fn download_stream(
        &self,
        format_selector: &str,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn,
    ) -> Result<PathBuf, SourceError> {
        let template = format!("{}/%(title)s.%(ext)s", dest.display());
        let args = [
            "--no-playlist",
            "--newline",
            "--progress-template",
            progress::TEMPLATE,
            "-f",
            format_selector,
            "--no-simulate",
            "--print",
            "after_move:filepath",
            "-o",
            template.as_str(),
            url,
        ];
        let lines = self.run(&args, on_progress).await?;
        // The only non-progress stdout line is the printed final filepath.
        lines
            .into_iter()
            .rev()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .ok_or_else(|| SourceError::ToolFailed("yt-dlp reported no output file".to_string()))
    }
}

#[async_trait]
impl VideoSource for YtDlpSource {
    async fn metadata(&self, url: &str) -> Result<VideoMeta, SourceError> {
        let args = [
            "--no-playlist",
            "--skip-download",
            "--print",
            "title",
            "--print",
            "duration",
            url,
        ];
        let lines = self.run(&args, &|_| {}).await?;
        let mut lines = lines.into_iter();
        let title = lines
            .next()
            .ok_or_else(|| SourceError::ToolFailed("yt-dlp printed no title".to_string()))?;
        let duration_secs = lines
            .next()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .map(|d| d as u64)
            .unwrap_or(0);
        Ok(VideoMeta { title, duration_secs })
    }

    async fn download_video(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn,
    ) -> Result<PathBuf, SourceError> {
        // "best" picks the highest-resolution single-file stream, matching
        // the progressive-stream selection of the original tool.
        self.download_stream("best", url, dest, on_progress).await
    }

    async fn download_audio(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn,
    ) -> Result<PathBuf, SourceError> {
        self.download_stream("bestaudio", url, dest, on_progress).await
    }

    async fn fetch_captions(&self, url: &str) -> Result<String, SourceError> {
        // Subtitles can only be written to disk, so fetch into a scratch
        // directory and hand the text back to the dispatcher.
        let scratch = tempfile::tempdir()?;
        let template = format!("{}/captions", scratch.path().display());
        let args = [
            "--no-playlist",
            "--skip-download",
            "--write-subs",
            "--sub-langs",
            "en",
            "--convert-subs",
            "srt",
            "-o",
            template.as_str(),
            url,
        ];
        self.run(&args, &|_| {}).await?;
        let srt_path = scratch.path().join("captions.en.srt");
        if !srt_path.is_file() {
            // yt-dlp exits successfully when the language is simply absent.
            return Err(SourceError::NoCaptions);
        }
        Ok(std::fs::read_to_string(srt_path)?)
    }
}
