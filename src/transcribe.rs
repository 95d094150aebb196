use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use async_trait::async_trait;
use directories::ProjectDirs;
use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Fixed model size used for all transcriptions.
const MODEL_FILE: &str = "ggml-base.bin";

/// Seam for the speech-to-text step, mockable in dispatcher tests.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes `audio` and writes the text into `dest`, returning the
    /// path of the written transcript.
    async fn transcribe(&self, audio: &Path, dest: &Path) -> anyhow::Result<PathBuf>;
}

/// Transcript file naming: `<audio-base>_transcription_whisper.txt` next to
/// the other outputs in the destination directory.
pub fn transcript_path(audio: &Path, dest: &Path) -> PathBuf {
    let base = audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.join(format!("{base}_transcription_whisper.txt"))
}

/// Local whisper.cpp transcription via the whisper-rs bindings.
pub struct WhisperTranscriber {
    model_path: PathBuf,
    ffmpeg: PathBuf,
}

impl WhisperTranscriber {
    /// Resolves the model file under the platform data directory and
    /// locates ffmpeg for audio decoding. The model itself is only opened
    /// at transcription time.
    pub fn new() -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("", "", "tubescribe")
            .context("could not resolve a platform data directory")?;
        let model_path = dirs.data_dir().join("models").join(MODEL_FILE);
        let ffmpeg = which::which("ffmpeg").context("ffmpeg not found on PATH")?;
        Ok(Self { model_path, ffmpeg })
    }

    /// Decodes the audio file to the 16 kHz mono f32 PCM whisper expects.
    fn decode_samples(&self, audio: &Path) -> anyhow::Result<Vec<f32>> {
        let output = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(audio)
            .args(["-f", "f32le", "-ac", "1", "-ar", "16000", "pipe:1"])
            .output()
            .context("failed to spawn ffmpeg for audio decoding")?;
        if !output.status.success() {
            bail!(
                "ffmpeg decoding failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output
            .stdout
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    fn run_model(&self, audio: &Path, dest: &Path) -> anyhow::Result<PathBuf> {
        if !self.model_path.is_file() {
            bail!(
                "whisper model not found at {} (download {MODEL_FILE} there first)",
                self.model_path.display()
            );
        }

        let samples = self.decode_samples(audio)?;
        info!("transcribing {} ({} samples)", audio.display(), samples.len());

        // Ask for the accelerated device; whisper.cpp falls back to the CPU
        // when no GPU backend is compiled in or present.
        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(true);
        let model = self
            .model_path
            .to_str()
            .context("model path is not valid UTF-8")?;
        let ctx = WhisperContext::new_with_params(model, ctx_params)
            .context("failed to load whisper model")?;
        let mut state = ctx.create_state().context("failed to create whisper state")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        // No language hint: the model auto-detects.
        params.set_language(Some("auto"));
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .context("whisper inference failed")?;

        let mut text = String::new();
        let segments = state.full_n_segments().context("failed to read whisper segments")?;
        for i in 0..segments {
            text.push_str(&state.full_get_segment_text(i).context("bad whisper segment")?);
        }

        let out_path = transcript_path(audio, dest);
        std::fs::write(&out_path, text.trim_start())
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!("transcription completed and saved to {}", out_path.display());
        Ok(out_path)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &Path, dest: &Path) -> anyhow::Result<PathBuf> {
        let model_path = self.model_path.clone();
        let ffmpeg = self.ffmpeg.clone();
        let audio = audio.to_path_buf();
        let dest = dest.to_path_buf();
        // Inference is CPU-heavy and fully blocking; keep it off the
        // runtime's async workers.
        tokio::task::spawn_blocking(move || {
            WhisperTranscriber { model_path, ffmpeg }.run_model(&audio, &dest)
        })
        .await
        .context("transcription task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::transcript_path;
    use std::path::Path;

    #[test]
    fn transcript_is_named_after_audio_base() {
        let path = transcript_path(Path::new("/tmp/out/My Talk.mp3"), Path::new("/tmp/out"));
        assert_eq!(
            path,
            Path::new("/tmp/out/My Talk_transcription_whisper.txt")
        );
    }
}
