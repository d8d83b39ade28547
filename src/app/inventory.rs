// The seam between a run and the OS service manager.

use std::process::{Command, Output};

use log::debug;

use super::model::ServiceRecord;
use crate::config::ServiceScope;
use crate::error::QueryError;

/// Source of the host's registered services.
///
/// Every call performs a fresh query. Implementations return either the whole
/// inventory or an error, never a partial list.
pub trait ServiceInventory {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError>;
}

impl<T: ServiceInventory + ?Sized> ServiceInventory for Box<T> {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError> {
        (**self).list_services()
    }
}

impl<T: ServiceInventory + ?Sized> ServiceInventory for &T {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError> {
        (**self).list_services()
    }
}

/// The inventory backend for the current OS.
pub fn platform_inventory(scope: ServiceScope) -> Box<dyn ServiceInventory> {
    if cfg!(target_os = "linux") {
        Box::new(super::systemd::SystemdInventory::new(scope))
    } else if cfg!(windows) {
        if scope == ServiceScope::User {
            log::warn!("User scope is only supported with systemd, querying system services");
        }
        Box::new(super::windows::PowerShellInventory)
    } else {
        Box::new(Unsupported(std::env::consts::OS))
    }
}

struct Unsupported(&'static str);

impl ServiceInventory for Unsupported {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError> {
        Err(QueryError::Unsupported(self.0))
    }
}

/// Runs an inventory command and returns its stdout.
pub(super) fn run_query(command: &mut Command) -> Result<String, QueryError> {
    let display = describe(command);
    debug!("Running {display}");

    let Output {
        status,
        stdout,
        stderr,
    } = command.output().map_err(|source| QueryError::Spawn {
        command: display.clone(),
        source,
    })?;

    if !status.success() {
        return Err(QueryError::Status {
            command: display,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
