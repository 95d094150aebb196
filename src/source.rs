use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Basic metadata for the video behind a watch URL.
#[derive(Debug, Clone)]
pub struct VideoMeta {
    pub title: String,
    pub duration_secs: u64,
}

/// Errors from the video-source seam.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0} not found on PATH")]
    ToolMissing(&'static str),
    #[error("no matching stream is available")]
    NoStream,
    #[error("no English captions available")]
    NoCaptions,
    #[error("yt-dlp failed: {0}")]
    ToolFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Chunk-level progress callback; receives a completion fraction.
pub type ProgressFn = dyn Fn(f32) + Send + Sync;

/// Seam between the format dispatcher and the YouTube client tool.
///
/// The production implementation shells out to yt-dlp; tests substitute a
/// mock that serves files from disk without touching the network.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Title and length of the video, fetched without downloading.
    async fn metadata(&self, url: &str) -> Result<VideoMeta, SourceError>;

    /// Downloads the highest-available-resolution stream into `dest` and
    /// returns the path of the written file. `NoStream` if nothing matches.
    async fn download_video(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn,
    ) -> Result<PathBuf, SourceError>;

    /// Downloads an audio-only stream into `dest` and returns the path of
    /// the written file. `NoStream` if the video has no audio-only stream.
    async fn download_audio(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &ProgressFn,
    ) -> Result<PathBuf, SourceError>;

    /// Fetches English captions as SRT-formatted text. `NoCaptions` if the
    /// video has none.
    async fn fetch_captions(&self, url: &str) -> Result<String, SourceError>;
}
