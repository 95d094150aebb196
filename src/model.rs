use std::path::PathBuf;

/// The four output forms a download request can produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    /// Highest-available-resolution video file
    Video,
    /// Audio-only stream converted to MP3
    Audio,
    /// English captions written as subtitle text
    Captions,
    /// MP3 extraction followed by local Whisper transcription
    Transcript,
}

impl OutputFormat {
    /// Label shown next to the radio button for this format.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Video => "MP4",
            OutputFormat::Audio => "MP3",
            OutputFormat::Captions => "Text",
            OutputFormat::Transcript => "Whisper Transcription",
        }
    }

    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Video,
        OutputFormat::Audio,
        OutputFormat::Captions,
        OutputFormat::Transcript,
    ];
}

/// Messages posted by worker threads and drained by the egui update loop.
///
/// All cross-thread UI communication goes through this queue; background
/// work never touches widget state directly.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Download progress as a fraction in `0.0..=1.0`
    Progress(f32),
    /// Elapsed-time label text (`MM:SS`)
    Elapsed(String),
    /// Human-readable status line (e.g. the video title)
    Status(String),
    /// A job finished; carries the destination directory for the
    /// open-folder prompt
    Finished(PathBuf),
    /// A job failed; carries the error text for the status line
    Failed(String),
}
