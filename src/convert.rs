use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use async_trait::async_trait;
use tokio::process::Command;

/// Seam for the downloaded-audio → MP3 conversion step.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn to_mp3(&self, input: &Path, output: &Path) -> anyhow::Result<()>;
}

/// ffmpeg-backed converter.
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
}

impl FfmpegConverter {
    /// Locates ffmpeg on PATH.
    pub fn locate() -> anyhow::Result<Self> {
        let ffmpeg = which::which("ffmpeg").context("ffmpeg not found on PATH")?;
        Ok(Self { ffmpeg })
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn to_mp3(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        let result = Command::new(&self.ffmpeg)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "2"])
            .arg(output)
            .output()
            .await
            .context("failed to spawn ffmpeg")?;
        if !result.status.success() {
            bail!(
                "ffmpeg conversion failed: {}",
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }
        Ok(())
    }
}
