//! YouTube downloader GUI with MP3 extraction, caption export and local
//! Whisper transcription.

// Downloaded-audio → MP3 conversion (ffmpeg)
mod convert;
// Format dispatcher: one straight-line pipeline per output format
mod dispatch;
// Session data: output formats and the UI event queue
mod model;
// yt-dlp progress-line parsing
mod progress;
// Video-source seam (trait + errors)
mod source;
// Elapsed-time ticker for the long conversion paths
mod timer;
// Local speech-to-text via whisper.cpp
mod transcribe;
// Watch-link canonicalization
mod url_norm;
// yt-dlp-backed video source
mod ytdlp;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::{App, Frame, egui};
use egui::Visuals;
use once_cell::sync::OnceCell;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::convert::FfmpegConverter;
use crate::model::{OutputFormat, UiEvent};
use crate::transcribe::{Transcriber, WhisperTranscriber};
use crate::ytdlp::YtDlpSource;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// Program entry point: initializes logging and the runtime, launches the GUI
fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rt = Arc::new(Runtime::new().expect("failed to start tokio runtime"));
    RUNTIME.set(rt).expect("runtime initialized twice");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "YouTube Downloader",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::new())
        }),
    )
}

/// Application state for the GUI
struct DownloaderApp {
    /// Input field for the YouTube URL
    url_input: String,
    /// Currently selected output format
    format: OutputFormat,
    /// Progress bar fraction (0.0 to 1.0)
    download_progress: f32,
    /// Elapsed-time label text (`MM:SS`)
    elapsed: String,
    /// Status line under the progress widgets
    status: String,
    /// Sender cloned into every worker job
    events_tx: UnboundedSender<UiEvent>,
    /// Single consumer of all worker events, drained each frame
    events_rx: UnboundedReceiver<UiEvent>,
}

impl DownloaderApp {
    fn new() -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            url_input: String::new(),
            format: OutputFormat::Video,
            download_progress: 0.0,
            elapsed: "00:00".to_string(),
            status: String::new(),
            events_tx,
            events_rx,
        }
    }

    /// Spawns one download job on the shared runtime. Deliberately no
    /// queueing: a second click starts a second concurrent job sharing the
    /// same feedback widgets.
    fn spawn_job(&mut self, url: String, dest: PathBuf, format: OutputFormat) {
        let source = match YtDlpSource::locate() {
            Ok(source) => source,
            Err(e) => return self.report_setup_error(e.to_string()),
        };
        let converter = match FfmpegConverter::locate() {
            Ok(converter) => converter,
            Err(e) => return self.report_setup_error(e.to_string()),
        };
        let transcriber: Option<Box<dyn Transcriber>> = if format == OutputFormat::Transcript {
            match WhisperTranscriber::new() {
                Ok(transcriber) => Some(Box::new(transcriber)),
                Err(e) => return self.report_setup_error(e.to_string()),
            }
        } else {
            None
        };

        self.download_progress = 0.0;
        self.elapsed = "00:00".to_string();
        self.status = "Working…".to_string();

        let tx = self.events_tx.clone();
        RUNTIME.get().expect("runtime not initialized").spawn(async move {
            let result = dispatch::run_job(
                &source,
                &converter,
                transcriber.as_deref(),
                &url,
                &dest,
                format,
                tx.clone(),
            )
            .await;
            match result {
                Ok(()) => {
                    let _ = tx.send(UiEvent::Finished(dest));
                }
                Err(e) => {
                    error!("an error occurred: {e:#}");
                    let _ = tx.send(UiEvent::Failed(e.to_string()));
                }
            }
        });
    }

    fn report_setup_error(&mut self, message: String) {
        error!("{message}");
        self.status = message;
    }

    /// Drains the worker event queue; the update loop is the only writer of
    /// widget state.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                UiEvent::Progress(fraction) => self.download_progress = fraction,
                UiEvent::Elapsed(text) => self.elapsed = text,
                UiEvent::Status(text) => self.status = text,
                UiEvent::Failed(message) => {
                    self.status = format!("Failed: {message}");
                }
                UiEvent::Finished(dest) => {
                    self.download_progress = 1.0;
                    self.status = "Download complete".to_string();
                    let open = MessageDialog::new()
                        .set_level(MessageLevel::Info)
                        .set_title("Open Folder")
                        .set_description("Download complete. Do you want to open the folder?")
                        .set_buttons(MessageButtons::YesNo)
                        .show();
                    if open {
                        open_folder(&dest);
                    }
                }
            }
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Downloader");

            ui.group(|ui| {
                ui.label("Enter the YouTube video URL:");
                ui.text_edit_singleline(&mut self.url_input);
            });

            ui.group(|ui| {
                ui.label("Select Format:");
                ui.horizontal(|ui| {
                    for format in OutputFormat::ALL {
                        ui.radio_value(&mut self.format, format, format.label());
                    }
                });
            });

            ui.group(|ui| {
                ui.label("Progress:");
                ui.add(egui::ProgressBar::new(self.download_progress).show_percentage());
                ui.label(format!("Time: {}", self.elapsed));
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });

            if ui.button("Download").clicked() {
                let url = url_norm::normalize(self.url_input.trim());
                info!("cleaned URL: {url}");
                // Folder picker blocks the GUI thread; the job only starts
                // once a directory was actually chosen.
                if let Some(dest) = FileDialog::new().pick_folder() {
                    self.spawn_job(url, dest, self.format);
                }
            }
        });

        // Request periodic repaint for progress updates
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/// Opens the destination folder with the platform file manager.
fn open_folder(folder: &Path) {
    let folder = folder.to_path_buf();
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        {
            let _ = std::process::Command::new("explorer").arg(folder).spawn();
        }
        #[cfg(target_os = "macos")]
        {
            let _ = std::process::Command::new("open").arg(folder).spawn();
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let _ = std::process::Command::new("xdg-open").arg(folder).spawn();
        }
    });
}
