use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::JobConfig;
use crate::humanize::{format_bytes, format_duration, format_speed};
use crate::progress::{DownloadProgress, ProgressMessage, TrackInfo};
use crate::session::PollResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Flac,
    Wav,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 4] = [Self::Mp3, Self::M4a, Self::Flac, Self::Wav];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }

    /// Lossless targets ignore the bitrate setting.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Mp3 | Self::M4a)
    }

    /// Containers ffmpeg can attach cover art to.
    pub fn supports_embedded_cover(self) -> bool {
        !matches!(self, Self::Wav)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverFormat {
    #[default]
    Jpg,
    Png,
    Webp,
}

impl CoverFormat {
    pub const ALL: [CoverFormat; 3] = [Self::Jpg, Self::Png, Self::Webp];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for CoverFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the start/cancel button pair currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Canceling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    Canceled,
    /// The worker exited without posting a terminal message.
    Vanished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Download,
    Settings,
    About,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub url: String,
    pub config: JobConfig,
    pub tab: Tab,
    pub phase: JobPhase,
    /// Percentage shown by the progress bar, `0.0..=100.0`.
    pub progress: f32,
    /// Set while the total size is unknown; the bar animates instead.
    pub indeterminate: bool,
    pub progress_label: String,
    pub status: String,
    pub log: Vec<String>,
    pub track: Option<TrackInfo>,
    pub last_outcome: Option<JobOutcome>,
}

impl AppState {
    pub fn new(config: JobConfig, ready_text: impl Into<String>) -> Self {
        Self {
            config,
            status: ready_text.into(),
            progress_label: "0%".to_string(),
            ..Default::default()
        }
    }

    pub fn can_start(&self) -> bool {
        self.phase == JobPhase::Idle
    }

    pub fn can_cancel(&self) -> bool {
        self.phase == JobPhase::Running
    }

    /// Resets the display for a new job and flips the buttons.
    pub fn begin_job(&mut self, preparing_text: impl Into<String>) {
        self.phase = JobPhase::Running;
        self.set_progress(0.0);
        self.indeterminate = false;
        self.log.clear();
        self.track = None;
        self.last_outcome = None;
        self.status = preparing_text.into();
    }

    pub fn begin_cancel(&mut self, canceling_text: impl Into<String>) {
        if self.phase == JobPhase::Running {
            self.phase = JobPhase::Canceling;
            self.status = canceling_text.into();
        }
    }

    /// Applies one worker message. Returns the outcome when the message ends
    /// the job.
    pub fn apply(&mut self, message: ProgressMessage) -> Option<JobOutcome> {
        match message {
            ProgressMessage::Status(text) => {
                self.push_log(&text);
                self.status = text;
                None
            }
            ProgressMessage::Progress(progress) => {
                self.apply_progress(&progress);
                None
            }
            ProgressMessage::Info(info) => {
                self.track = Some(info);
                None
            }
            ProgressMessage::Complete(text) => {
                let line = format!("✅ {text}");
                self.push_log(&line);
                self.status = line;
                self.finish(JobOutcome::Completed);
                Some(JobOutcome::Completed)
            }
            ProgressMessage::Error(text) => {
                let line = format!("❌ {text}");
                self.push_log(&line);
                self.status = line;
                self.finish(JobOutcome::Failed);
                Some(JobOutcome::Failed)
            }
            ProgressMessage::Canceled(text) => {
                let line = format!("⚠️ {text}");
                self.push_log(&line);
                self.status = line;
                self.finish(JobOutcome::Canceled);
                Some(JobOutcome::Canceled)
            }
        }
    }

    /// Applies one tick of the polling loop: every message in order, then the
    /// worker's exit. A worker that is gone while the job is still running
    /// ends it as [`JobOutcome::Vanished`].
    ///
    /// Returns the outcome of the job when it ended during this tick.
    pub fn apply_poll(&mut self, poll: PollResult) -> Option<JobOutcome> {
        let mut outcome = None;
        for message in poll.messages {
            if let Some(ended) = self.apply(message) {
                outcome = Some(ended);
            }
        }

        if poll.worker_exited && !self.can_start() {
            warn!("Download worker exited without a final message");
            self.finish(JobOutcome::Vanished);
            outcome = Some(JobOutcome::Vanished);
        }
        outcome
    }

    /// Returns the buttons to idle. Failures reset the bar, success fills it.
    pub fn finish(&mut self, outcome: JobOutcome) {
        self.indeterminate = false;
        if outcome == JobOutcome::Completed {
            self.set_progress(100.0);
        } else {
            self.set_progress(0.0);
        }
        self.phase = JobPhase::Idle;
        self.last_outcome = Some(outcome);
    }

    pub fn push_log(&mut self, text: &str) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.log.push(format!("[{stamp}] {text}"));
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn apply_progress(&mut self, progress: &DownloadProgress) {
        match progress.percent {
            Some(percent) => {
                self.indeterminate = false;
                self.set_progress(percent);
                self.status = progress_status_line(self.progress, progress);
            }
            None => {
                self.indeterminate = true;
                self.progress_label = "...".to_string();
                self.status = format!("Descargando... {}", format_bytes(progress.downloaded));
            }
        }
    }

    fn set_progress(&mut self, percent: f32) {
        self.progress = percent.clamp(0.0, 100.0);
        self.progress_label = format!("{:.0}%", self.progress);
    }
}

/// `12.5% - 1.0 MB / 8.0 MB - 256.0 KB/s - ETA: 28s`
pub fn progress_status_line(percent: f32, progress: &DownloadProgress) -> String {
    let mut line = format!("{percent:.1}% - {}", format_bytes(progress.downloaded));
    if let Some(total) = progress.total.filter(|total| *total > 0) {
        line.push_str(&format!(" / {}", format_bytes(total)));
    }
    let speed = format_speed(progress.speed);
    if !speed.is_empty() {
        line.push_str(&format!(" - {speed}"));
    }
    if let Some(eta) = progress.eta.filter(|eta| *eta > 0) {
        line.push_str(&format!(" - ETA: {eta}s"));
    }
    line
}

/// Multi-line summary for the track info panel.
pub fn track_summary(info: &TrackInfo) -> String {
    let mut text = format!("Titulo: {}\nArtista: {}", info.title, info.artist);
    if let Some(duration) = info.duration.filter(|d| *d > 0.0) {
        text.push_str(&format!("\nDuracion: {}", format_duration(duration)));
    }
    text
}
