use std::sync::Arc;

use log::warn;

use crate::config::ConfigStore;
use crate::error::Result;
use crate::extractor::{Extractor, YtDlp};

/// Collaborators shared by the whole application, built once in `main`.
#[derive(Clone)]
pub struct AppContext {
    pub config_store: ConfigStore,
    pub extractor: Arc<dyn Extractor>,
}

impl AppContext {
    pub fn new(config_store: ConfigStore, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            config_store,
            extractor,
        }
    }

    /// Production wiring: yt-dlp from PATH and the default settings file.
    ///
    /// Fails when yt-dlp is missing. A missing ffmpeg only warns, since some
    /// sources can be saved without transcoding.
    pub fn detect() -> Result<Self> {
        let ytdlp = YtDlp::locate()?;
        if which::which("ffmpeg").is_err() {
            warn!("ffmpeg not found on PATH; audio conversion will fail");
        }
        Ok(Self::new(ConfigStore::default(), Arc::new(ytdlp)))
    }
}
