//! The seam between the download worker and the tool that actually fetches
//! and transcodes media.
//!
//! The worker never sees command lines or callback signatures. It hands an
//! [`Extractor`] a [`DownloadRequest`] and an [`EventSink`]; the extractor
//! reports [`ExtractorEvent`]s and stops as soon as the sink answers
//! [`Flow::Abort`] or reports itself canceled.

pub mod ytdlp;

use std::path::Path;

use serde::Deserialize;

use crate::cancel::CancellationToken;
use crate::config::JobConfig;
use crate::error::Result;
use crate::models::{AudioFormat, CoverFormat};

pub use ytdlp::YtDlp;

/// Metadata returned by a probe. Every field is optional because sites fill
/// in different subsets.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub description: Option<String>,
    pub webpage_url: Option<String>,
}

impl MediaInfo {
    /// The artist if known, else the uploader.
    pub fn artist_name(&self) -> Option<&str> {
        [self.artist.as_deref(), self.uploader.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorEvent {
    Downloading {
        downloaded: u64,
        total: Option<u64>,
        total_estimate: Option<u64>,
        speed: Option<f64>,
        eta: Option<u64>,
        filename: String,
    },
    /// The raw download finished; post-processing follows.
    Finished { filename: String },
    /// A non-fatal error report. The extractor's return value decides whether
    /// the job failed.
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

/// Receives events while a download runs.
pub trait EventSink {
    fn on_event(&mut self, event: ExtractorEvent) -> Flow;

    /// Polled while the extractor waits without events, so a quiet tool can
    /// still be stopped.
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Everything an extractor needs to fetch and convert one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    /// Output directory joined with the filename template.
    pub output_template: String,
    pub audio_format: AudioFormat,
    pub bitrate: String,
    pub embed_metadata: bool,
    pub embed_thumbnail: bool,
    pub save_cover_art: bool,
    pub cover_format: CoverFormat,
    pub skip_existing: bool,
    pub socket_timeout_secs: u32,
    pub retries: u32,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: &Path, config: &JobConfig) -> Self {
        Self {
            url: url.into(),
            output_template: output_dir.join(&config.template).to_string_lossy().into_owned(),
            audio_format: config.format,
            bitrate: config.bitrate.clone(),
            embed_metadata: true,
            embed_thumbnail: config.format.supports_embedded_cover(),
            save_cover_art: config.save_cover_art,
            cover_format: config.cover_format,
            skip_existing: config.skip_existing,
            socket_timeout_secs: 30,
            retries: 3,
        }
    }
}

/// A media extraction backend.
///
/// Both operations must return [`crate::Error::Canceled`] once they stop
/// because of cancellation, and must not leave any child process behind.
pub trait Extractor: Send + Sync {
    /// Metadata only; nothing is written to disk.
    fn probe(&self, url: &str, token: &CancellationToken) -> Result<MediaInfo>;

    fn download(&self, request: &DownloadRequest, sink: &mut dyn EventSink) -> Result<()>;
}
