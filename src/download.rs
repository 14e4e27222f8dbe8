use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info};

use crate::cancel::CancellationToken;
use crate::config::JobConfig;
use crate::error::{Error, Result, ValidationError};
use crate::extractor::{DownloadRequest, EventSink, Extractor, ExtractorEvent, Flow, MediaInfo};
use crate::progress::{DownloadProgress, ProgressMessage, ProgressSender, TrackInfo};

pub const STATUS_EXTRACTING: &str = "Extrayendo información...";
pub const STATUS_STARTING: &str = "Iniciando descarga...";
pub const STATUS_PROCESSING: &str = "Procesando audio...";
pub const MSG_COMPLETE: &str = "Descarga completada exitosamente";
pub const MSG_CANCELED: &str = "Descarga cancelada por usuario";

const UNKNOWN: &str = "Unknown";

/// One user request: a URL plus a snapshot of the settings taken at start.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub config: JobConfig,
}

impl DownloadJob {
    pub fn new(url: impl Into<String>, config: JobConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }
}

/// Checks user input before a job is created. A missing output directory is
/// accepted; the worker creates it.
pub fn validate(url: &str, output_dir: &Path) -> std::result::Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if output_dir.as_os_str().is_empty() || (output_dir.exists() && !output_dir.is_dir()) {
        return Err(ValidationError::InvalidOutputDir(
            output_dir.display().to_string(),
        ));
    }
    Ok(())
}

/// Runs `job` on a new thread. The thread posts exactly one terminal message.
pub fn start_download(
    job: DownloadJob,
    extractor: Arc<dyn Extractor>,
    tx: ProgressSender,
    token: CancellationToken,
) -> Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("download-worker".into())
        .spawn(move || run_job(&job, extractor.as_ref(), &tx, &token))?;
    Ok(handle)
}

/// Runs `job` on the calling thread and posts its terminal message.
pub fn run_job(
    job: &DownloadJob,
    extractor: &dyn Extractor,
    tx: &ProgressSender,
    token: &CancellationToken,
) {
    info!("Starting download of {}", job.url);
    let result = execute(job, extractor, tx, token);

    let terminal = if token.is_canceled() {
        info!("Download of {} canceled", job.url);
        ProgressMessage::Canceled(MSG_CANCELED.to_string())
    } else {
        match result {
            Ok(()) => {
                info!("Download of {} complete", job.url);
                ProgressMessage::Complete(MSG_COMPLETE.to_string())
            }
            Err(err) => {
                error!("Download error: {}", err);
                ProgressMessage::Error(format!("Error: {err}"))
            }
        }
    };
    tx.send(terminal);
}

fn execute(
    job: &DownloadJob,
    extractor: &dyn Extractor,
    tx: &ProgressSender,
    token: &CancellationToken,
) -> Result<()> {
    let mut output_dir = job.config.output_dir.clone();
    let mut preflight = None;

    if job.config.create_artist_folders {
        match extractor.probe(&job.url, token) {
            Ok(info) => {
                output_dir = artist_dir(&output_dir, &info);
                preflight = Some(info);
            }
            Err(Error::Canceled) => return Err(Error::Canceled),
            Err(err) => debug!("Artist probe failed, using base folder: {}", err),
        }
    }

    fs::create_dir_all(&output_dir)?;
    debug!("Output directory {}", output_dir.display());

    if token.is_canceled() {
        return Err(Error::Canceled);
    }

    tx.status(STATUS_EXTRACTING);
    let media = match preflight {
        Some(info) => info,
        None => extractor.probe(&job.url, token)?,
    };
    tx.send(ProgressMessage::Info(track_info(&media, &job.url)));
    tx.status(STATUS_STARTING);

    let request = DownloadRequest::new(job.url.clone(), &output_dir, &job.config);
    let mut reporter = ProgressReporter { tx, token };
    extractor.download(&request, &mut reporter)
}

/// The per-artist subfolder under `base`.
fn artist_dir(base: &Path, info: &MediaInfo) -> PathBuf {
    let artist = info.artist_name().unwrap_or(UNKNOWN);
    let folder = sanitize_filename(artist);
    if folder.is_empty() {
        base.join(UNKNOWN)
    } else {
        base.join(folder)
    }
}

fn track_info(media: &MediaInfo, url: &str) -> TrackInfo {
    TrackInfo {
        title: media.title.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        artist: media.artist_name().unwrap_or(UNKNOWN).to_string(),
        duration: media.duration,
        description: media.description.clone().unwrap_or_default(),
        source_url: media.webpage_url.clone().unwrap_or_else(|| url.to_string()),
    }
}

/// Removes characters that are invalid in file names on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    name.chars()
        .filter(|c| !INVALID.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Turns extractor events into progress messages and checks the token at
/// every event.
struct ProgressReporter<'a> {
    tx: &'a ProgressSender,
    token: &'a CancellationToken,
}

impl EventSink for ProgressReporter<'_> {
    fn on_event(&mut self, event: ExtractorEvent) -> Flow {
        if self.token.is_canceled() {
            return Flow::Abort;
        }

        match event {
            ExtractorEvent::Downloading {
                downloaded,
                total,
                total_estimate,
                speed,
                eta,
                filename,
            } => {
                let total = total.filter(|t| *t > 0).or(total_estimate);
                self.tx.send(ProgressMessage::Progress(DownloadProgress::new(
                    downloaded,
                    total,
                    speed,
                    eta,
                    base_name(&filename),
                )));
            }
            ExtractorEvent::Finished { filename } => {
                self.tx
                    .status(format!("Descarga finalizada: {}", base_name(&filename)));
                self.tx.status(STATUS_PROCESSING);
            }
            ExtractorEvent::Error { message } => {
                self.tx.status(format!("Error en descarga: {message}"));
            }
        }
        Flow::Continue
    }

    fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
