// Error types for each stage of a run.

use std::io;
use std::path::PathBuf;

/// The log directory could not be created or accessed.
#[derive(Debug, thiserror::Error)]
#[error("Could not create log directory {}: {source}", .path.display())]
pub struct DirectoryError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The OS service facility could not be queried, or returned something we don't understand.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Status {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Could not parse service list from {command}: {reason}")]
    Parse { command: String, reason: String },

    #[error("Unrecognized service state '{value}' for {service}")]
    UnknownState { service: String, value: String },

    #[error("Service enumeration is not supported on {0}")]
    Unsupported(&'static str),
}

/// Appending to the log file failed.
#[derive(Debug, thiserror::Error)]
#[error("Could not write to {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Buffer size {0} is out of range (expected {min}..={max})", min = crate::config::BufferSize::MIN, max = crate::config::BufferSize::MAX)]
    BufferSizeOutOfRange(usize),
}

/// Any failure that moves a run into the failed state.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
