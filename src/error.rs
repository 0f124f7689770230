//! Error types for the P2P bandwidth checker

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The executable could not be started (missing, not executable, exec failure)
    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing a file failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize GPU records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to parse configuration {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Terminal setup, drawing or input failure
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Error::ProcessLaunch {
            program: program.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigParse { .. }
            | Error::ConfigValidation { .. } => 2,
            _ => 1,
        }
    }
}
