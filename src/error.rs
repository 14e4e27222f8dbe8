use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures inside a download job or while talking to the configuration file.
///
/// None of these ever reach the UI as values: the worker turns them into a
/// terminal progress message with a readable description.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required external program could not be found on PATH.
    #[error("{program} not found: {source}")]
    DependencyMissing {
        program: &'static str,
        #[source]
        source: which::Error,
    },

    /// The external program failed to start.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction tool reported a failure.
    #[error("{0}")]
    Extractor(String),

    /// The job was aborted through its cancellation token.
    #[error("canceled by user")]
    Canceled,
}

/// Input problems detected before a job is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty URL")]
    EmptyUrl,

    #[error("invalid output directory: {0}")]
    InvalidOutputDir(String),
}
