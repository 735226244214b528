//! Error taxonomy for the transcription pipeline.
//!
//! Discovery and configuration errors abort a run before any work starts.
//! Per-item engine and write errors are caught by the batch runner and
//! recorded as failed outcomes instead of propagating.

use std::path::PathBuf;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The input path does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A single input file has an extension outside the supported set.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration value (file, environment, or override).
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or rejected credential for the cloud engine.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The selected engine is not available in this build.
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),

    /// Any failure inside an engine invocation, decode included.
    #[error("engine error: {0}")]
    Engine(String),

    /// Writing a formatted output artifact failed.
    #[error("failed to write output {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable kind name, used in batch reports and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::PathNotFound(_) => "path-not-found",
            Error::UnsupportedFormat(_) => "unsupported-format",
            Error::Config(_) => "configuration",
            Error::Auth(_) => "authentication",
            Error::UnsupportedEngine(_) => "unsupported-engine",
            Error::Engine(_) => "engine",
            Error::OutputWrite { .. } => "output-write",
            Error::Io(_) => "io",
        }
    }
}
