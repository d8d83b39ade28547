// Defines the core data structures for a logging run.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

/// Format used for every timestamp written to the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run state of a service, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Paused,
    StartPending,
    StopPending,
    Unknown,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 6] = [
        ServiceStatus::Running,
        ServiceStatus::Stopped,
        ServiceStatus::Paused,
        ServiceStatus::StartPending,
        ServiceStatus::StopPending,
        ServiceStatus::Unknown,
    ];

    /// Canonical name, used verbatim in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Running => "Running",
            ServiceStatus::Stopped => "Stopped",
            ServiceStatus::Paused => "Paused",
            ServiceStatus::StartPending => "StartPending",
            ServiceStatus::StopPending => "StopPending",
            ServiceStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ServiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A service as seen by the OS at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub name: String,
    pub display_name: String,
    pub status: ServiceStatus,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        status: ServiceStatus,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            status,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.status == ServiceStatus::Stopped
    }
}

/// One line of a run's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub service_name: String,
    pub display_name: String,
    pub status: ServiceStatus,
}

impl LogEntry {
    pub fn new(timestamp: NaiveDateTime, record: ServiceRecord) -> Self {
        Self {
            timestamp,
            service_name: record.name,
            display_name: record.display_name,
            status: record.status,
        }
    }
}

/// Marks the start of a run in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSeparator {
    pub timestamp: NaiveDateTime,
}
