//! Typed messages from the download worker to the UI and the queue that
//! carries them.

use std::sync::mpsc::{self, Receiver, Sender};

/// A download-progress sample as shown by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    /// `None` when the total size is unknown. Always within `0.0..=100.0`.
    pub percent: Option<f32>,
    pub downloaded: u64,
    pub total: Option<u64>,
    pub speed: Option<f64>,
    pub eta: Option<u64>,
    pub filename: String,
}

impl DownloadProgress {
    pub fn new(
        downloaded: u64,
        total: Option<u64>,
        speed: Option<f64>,
        eta: Option<u64>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            percent: total.and_then(|total| percent_of(downloaded, total)),
            downloaded,
            total,
            speed,
            eta,
            filename: filename.into(),
        }
    }
}

/// Share of `total` already downloaded, clamped to `[0, 100]`.
pub fn percent_of(downloaded: u64, total: u64) -> Option<f32> {
    if total == 0 {
        return None;
    }
    let percent = downloaded as f64 / total as f64 * 100.0;
    Some(percent.clamp(0.0, 100.0) as f32)
}

/// Metadata about the track being fetched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    /// Seconds.
    pub duration: Option<f64>,
    pub description: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    Status(String),
    Progress(DownloadProgress),
    Info(TrackInfo),
    Complete(String),
    Error(String),
    Canceled(String),
}

impl ProgressMessage {
    /// Exactly one terminal message ends every job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressMessage::Complete(_) | ProgressMessage::Error(_) | ProgressMessage::Canceled(_)
        )
    }
}

/// Worker side of the progress queue.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Sender<ProgressMessage>,
}

impl ProgressSender {
    /// Queues a message. A receiver that has gone away is not an error for the
    /// worker; the message is dropped.
    pub fn send(&self, message: ProgressMessage) {
        if let Err(err) = self.tx.send(message) {
            log::debug!("Progress receiver gone, dropping {:?}", err.0);
        }
    }

    pub fn status(&self, text: impl Into<String>) {
        self.send(ProgressMessage::Status(text.into()));
    }
}

/// UI side of the progress queue.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: Receiver<ProgressMessage>,
}

impl ProgressReceiver {
    /// Takes every message queued so far, oldest first, without blocking.
    pub fn drain(&self) -> Vec<ProgressMessage> {
        self.rx.try_iter().collect()
    }
}

/// Creates an unbounded FIFO progress queue.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}
