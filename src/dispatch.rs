use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::convert::AudioConverter;
use crate::model::{OutputFormat, UiEvent};
use crate::source::{ProgressFn, VideoSource};
use crate::timer::Timer;
use crate::transcribe::Transcriber;

/// Runs one download request end to end on a worker task.
///
/// Each format tag is an independent straight-line sequence of calls into
/// the source, the converter and (for transcripts) the transcriber. Errors
/// propagate to the spawn site, which logs them and posts a `Failed` event;
/// partial files already on disk are left in place.
pub async fn run_job(
    source: &dyn VideoSource,
    converter: &dyn AudioConverter,
    transcriber: Option<&dyn Transcriber>,
    url: &str,
    dest: &Path,
    format: OutputFormat,
    events: UnboundedSender<UiEvent>,
) -> anyhow::Result<()> {
    let meta = source.metadata(url).await?;
    info!("title: {}", meta.title);
    info!("length: {} seconds", meta.duration_secs);
    let _ = events.send(UiEvent::Status(meta.title.clone()));

    let progress_events = events.clone();
    let on_progress = move |fraction: f32| {
        let _ = progress_events.send(UiEvent::Progress(fraction));
    };

    match format {
        OutputFormat::Video => {
            let path = source.download_video(url, dest, &on_progress).await?;
            info!("download completed and saved to {}", path.display());
        }
        OutputFormat::Audio => {
            let timer = Timer::start(events.clone());
            extract_mp3(source, converter, url, dest, &on_progress).await?;
            timer.stop();
        }
        OutputFormat::Captions => {
            let srt = source.fetch_captions(url).await?;
            let text_path = dest.join(format!("{}.txt", meta.title));
            std::fs::write(&text_path, srt)
                .with_context(|| format!("failed to write {}", text_path.display()))?;
            info!("text extraction completed and saved to {}", text_path.display());
        }
        OutputFormat::Transcript => {
            let transcriber = transcriber.context("transcription backend unavailable")?;
            let timer = Timer::start(events.clone());
            let mp3_path = extract_mp3(source, converter, url, dest, &on_progress).await?;
            transcriber.transcribe(&mp3_path, dest).await?;
            timer.stop();
        }
    }
    Ok(())
}

/// Audio pipeline shared by the MP3 and transcript formats: download the
/// audio-only stream, convert it to MP3 at the same base name, then delete
/// the intermediate download.
async fn extract_mp3(
    source: &dyn VideoSource,
    converter: &dyn AudioConverter,
    url: &str,
    dest: &Path,
    on_progress: &ProgressFn,
) -> anyhow::Result<PathBuf> {
    let audio_path = source.download_audio(url, dest, on_progress).await?;
    let mp3_path = audio_path.with_extension("mp3");
    converter.to_mp3(&audio_path, &mp3_path).await?;
    std::fs::remove_file(&audio_path)
        .with_context(|| format!("failed to remove {}", audio_path.display()))?;
    info!("MP3 conversion completed and saved to {}", mp3_path.display());
    Ok(mp3_path)
}
