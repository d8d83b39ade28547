//! Configuration for a logging run.
//!
//! Options come from the command line first and fall back to environment
//! variables, then to platform defaults.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use clap::builder::{BoolishValueParser, FalseyValueParser};

use crate::error::ConfigError;

pub const LOG_FILE_NAME: &str = "StoppedServices.log";

/// Number of formatted lines held in memory before a physical write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize(usize);

impl BufferSize {
    pub const MIN: usize = 10;
    pub const MAX: usize = 1000;
    pub const DEFAULT: BufferSize = BufferSize(100);

    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(ConfigError::BufferSizeOutOfRange(size))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which service manager instance to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceScope {
    #[default]
    System,
    /// The per-user systemd instance. Ignored on platforms without one.
    User,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// File the stopped services are appended to
    pub log_path: PathBuf,

    pub buffer_size: BufferSize,

    pub scope: ServiceScope,

    /// Style the summary with terminal colors
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: default_logs_dir().join(LOG_FILE_NAME),
            buffer_size: BufferSize::default(),
            scope: ServiceScope::default(),
            color: false,
        }
    }
}

pub fn default_logs_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Logs")
    } else {
        PathBuf::from("logs")
    }
}

/// Append the names of all stopped services to a log file.
#[derive(Debug, Parser)]
#[command(name = "stopped-services", version)]
pub struct Cli {
    /// Log file to append to [default: <logs-dir>/StoppedServices.log]
    #[arg(long, env = "STOPPED_SERVICES_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Directory holding the default log file
    #[arg(long, env = "STOPPED_SERVICES_LOGS_DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Lines buffered before each write (10-1000)
    // range is checked by `BufferSize::new` so a bad value is a config error
    #[arg(long, env = "STOPPED_SERVICES_BUFFER_SIZE", default_value_t = BufferSize::DEFAULT.get())]
    pub buffer_size: usize,

    /// Query the per-user service manager instead of the system one
    #[arg(long, env = "STOPPED_SERVICES_USER_SCOPE", value_parser = BoolishValueParser::new())]
    pub user: bool,

    /// Print the summary without colors
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves the parsed arguments into a validated configuration.
    /// `is_terminal` tells whether stdout can take colors.
    pub fn into_config(self, is_terminal: bool) -> Result<Config, ConfigError> {
        let log_path = match (self.log_path, self.logs_dir) {
            (Some(path), _) => path,
            (None, Some(dir)) => dir.join(LOG_FILE_NAME),
            (None, None) => default_logs_dir().join(LOG_FILE_NAME),
        };

        Ok(Config {
            log_path,
            buffer_size: BufferSize::new(self.buffer_size)?,
            scope: if self.user {
                ServiceScope::User
            } else {
                ServiceScope::System
            },
            color: is_terminal && !self.no_color,
        })
    }
}
