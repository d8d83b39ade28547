// The run controller: directory, inventory, log, summary.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDateTime, Timelike};
use log::{debug, error, info};

pub mod format;
pub mod inventory;
pub mod model;
pub mod sink;
pub mod systemd;
pub mod ui;
pub mod windows;

use crate::config::Config;
use crate::error::RunError;
use inventory::ServiceInventory;
use model::{LogEntry, RunSeparator};
use sink::LogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    DirectoryReady,
    InventoryFetched,
    Logged,
    Summarized,
    Success,
    Failed,
}

/// Outcome of one run, as reported to the user.
#[derive(Debug)]
pub struct RunSummary {
    /// Terminal state, `Success` or `Failed`
    pub state: RunState,
    pub stopped_count: usize,
    pub log_path: PathBuf,
    pub error: Option<RunError>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.state == RunState::Success
    }

    /// 0 on success, 1 on any failure.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

pub struct App<I> {
    inventory: I,
    sink: LogSink,
    color: bool,
    state: RunState,
}

impl<I: ServiceInventory> App<I> {
    pub fn new(config: &Config, inventory: I) -> Self {
        Self {
            inventory,
            sink: LogSink::new(&config.log_path, config.buffer_size),
            color: config.color,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the pipeline with the current local time.
    pub fn run(&mut self, out: &mut impl Write) -> RunSummary {
        let now = Local::now().naive_local();
        // second precision, shared by every line of this run
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        self.run_at(timestamp, out)
    }

    /// Runs the pipeline stamping every line with `timestamp`, then prints the
    /// summary to `out`.
    pub fn run_at(&mut self, timestamp: NaiveDateTime, out: &mut impl Write) -> RunSummary {
        self.state = RunState::Init;
        info!("Logging stopped services to {}", self.sink.path().display());

        let summary = match self.log_stopped(timestamp) {
            Ok(count) => RunSummary {
                state: RunState::Success,
                stopped_count: count,
                log_path: self.sink.path().to_path_buf(),
                error: None,
            },
            Err(e) => {
                error!("Run failed in state {:?}: {e}", self.state);
                RunSummary {
                    state: RunState::Failed,
                    stopped_count: 0,
                    log_path: self.sink.path().to_path_buf(),
                    error: Some(e),
                }
            }
        };

        // Summary output is best effort; the run outcome is already decided.
        if let Err(e) = ui::render_summary(out, &summary, self.color) {
            error!("Could not print summary: {e}");
        }
        if summary.is_success() {
            self.transition(RunState::Summarized);
        }
        self.transition(summary.state);
        summary
    }

    fn log_stopped(&mut self, timestamp: NaiveDateTime) -> Result<usize, RunError> {
        self.sink.ensure_directory()?;
        self.transition(RunState::DirectoryReady);

        let records = self.inventory.list_services()?;
        let total = records.len();
        let entries: Vec<LogEntry> = format::stopped_entries(records, timestamp);
        debug!("{} of {total} services are stopped", entries.len());
        self.transition(RunState::InventoryFetched);

        self.sink.append_separator(&RunSeparator { timestamp })?;
        let count = self.sink.append_entries(entries)?;
        self.transition(RunState::Logged);

        Ok(count)
    }

    fn transition(&mut self, next: RunState) {
        debug!("{:?} -> {next:?}", self.state);
        self.state = next;
    }
}
