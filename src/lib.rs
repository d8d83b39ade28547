//! Point-in-time inventory of stopped OS services.
//!
//! A run queries the host's service manager, keeps the services that are
//! stopped, and appends them as timestamped lines to an append-only log file,
//! one block per run.

pub mod app;
pub mod config;
pub mod error;

pub use app::{App, RunState, RunSummary};
pub use config::{Cli, Config};
