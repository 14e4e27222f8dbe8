//! Persistent job settings.
//!
//! Settings live in a small JSON file next to the executable's working
//! directory. Every field has a default so files written by older versions
//! keep working when new keys are introduced.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AudioFormat, CoverFormat};

pub const CONFIG_FILE: &str = "downloader_config.json";

pub const DEFAULT_BITRATE: &str = "192";
pub const BITRATE_OPTIONS: [&str; 5] = ["320", "256", "192", "128", "96"];

/// Prefers the `artist` field and falls back to the uploader, which is what
/// most SoundCloud tracks carry.
pub const DEFAULT_OUT_TEMPLATE: &str = "%(artist,uploader)s - %(title).200s.%(ext)s";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub output_dir: PathBuf,
    pub bitrate: String,
    pub format: AudioFormat,
    pub template: String,
    pub create_artist_folders: bool,
    pub skip_existing: bool,
    /// Kept for file compatibility; only one job ever runs.
    pub max_concurrent: u32,
    pub save_cover_art: bool,
    pub cover_format: CoverFormat,
    pub cover_size: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            bitrate: DEFAULT_BITRATE.to_string(),
            format: AudioFormat::default(),
            template: DEFAULT_OUT_TEMPLATE.to_string(),
            create_artist_folders: false,
            skip_existing: true,
            max_concurrent: 3,
            save_cover_art: true,
            cover_format: CoverFormat::default(),
            cover_size: "original".to_string(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

/// Reads and writes [`JobConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, substituting defaults for anything that cannot be
    /// read. Never fails.
    pub fn load(&self) -> JobConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config from {:?}: {}", self.path, err);
                JobConfig::default()
            }
        }
    }

    /// A missing file is not an error; it yields the defaults.
    pub fn try_load(&self) -> Result<JobConfig> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(JobConfig::default()),
            Err(err) => return Err(err.into()),
        };
        let config = serde_json::from_str(&content)?;
        info!("Loaded config from {:?}", self.path);
        Ok(config)
    }

    /// Writes the settings. Failures are logged and reported as `false`.
    pub fn save(&self, config: &JobConfig) -> bool {
        match self.try_save(config) {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to save config to {:?}: {}", self.path, err);
                false
            }
        }
    }

    pub fn try_save(&self, config: &JobConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        info!("Saved config to {:?}", self.path);
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}
