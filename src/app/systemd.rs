// Reads the service inventory from `systemctl`.

use std::process::Command;

use super::inventory::{ServiceInventory, run_query};
use super::model::{ServiceRecord, ServiceStatus};
use crate::config::ServiceScope;
use crate::error::QueryError;

pub struct SystemdInventory {
    scope: ServiceScope,
}

impl SystemdInventory {
    pub fn new(scope: ServiceScope) -> Self {
        Self { scope }
    }

    fn command(&self) -> Command {
        let mut command = Command::new("systemctl");
        if self.scope == ServiceScope::User {
            // ~/.config/systemd/user and /usr/lib/systemd/user
            command.arg("--user");
        }
        // --all to see inactive units, no-legend/no-pager for parsing safety
        command.args([
            "list-units",
            "--type=service",
            "--all",
            "--no-pager",
            "--no-legend",
            "--plain",
        ]);
        command
    }
}

impl ServiceInventory for SystemdInventory {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError> {
        let stdout = run_query(&mut self.command())?;
        parse_list_units(&stdout)
    }
}

/// Parses `systemctl list-units --no-legend` output.
///
/// Expected format: `unit load active sub description...`, optionally
/// prefixed by a `●` marker on failed or missing units.
pub fn parse_list_units(stdout: &str) -> Result<Vec<ServiceRecord>, QueryError> {
    let mut services = Vec::new();

    for line in stdout.lines() {
        let line = line
            .trim_start()
            .trim_start_matches(['●', '*'])
            .trim_start();
        if line.is_empty() {
            continue;
        }

        let Some((name, rest)) = next_field(line) else {
            continue;
        };
        let Some((_load, rest)) = next_field(rest) else {
            return Err(malformed(line));
        };
        let Some((active, rest)) = next_field(rest) else {
            return Err(malformed(line));
        };
        let Some((_sub, rest)) = next_field(rest) else {
            return Err(malformed(line));
        };

        let description = rest.trim();
        let display_name = if description.is_empty() {
            name
        } else {
            description
        };

        services.push(ServiceRecord::new(
            name,
            display_name,
            status_from_active_state(name, active)?,
        ));
    }

    Ok(services)
}

fn status_from_active_state(unit: &str, active: &str) -> Result<ServiceStatus, QueryError> {
    Ok(match active {
        "active" | "reloading" => ServiceStatus::Running,
        "inactive" | "failed" => ServiceStatus::Stopped,
        "activating" => ServiceStatus::StartPending,
        "deactivating" => ServiceStatus::StopPending,
        "maintenance" | "refreshing" => ServiceStatus::Unknown,
        other => {
            return Err(QueryError::UnknownState {
                service: unit.to_string(),
                value: other.to_string(),
            });
        }
    })
}

/// Splits off the next whitespace-delimited field.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}

fn malformed(line: &str) -> QueryError {
    QueryError::Parse {
        command: "systemctl list-units".to_string(),
        reason: format!("unexpected line '{line}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
  accounts-daemon.service      loaded    active   running Accounts Service
● apparmor.service             loaded    failed   failed  Load AppArmor profiles
  cups.service                 loaded    inactive dead    CUPS Scheduler
  fstrim.service               loaded    activating start   Discard unused blocks on filesystems
  networkd-dispatcher.service  loaded    deactivating stop-sigterm Dispatcher daemon for systemd-networkd
  plymouth-quit.service        not-found inactive dead    plymouth-quit.service
  snapd.seeded.service         loaded    active   exited  Wait until snapd is fully seeded
";

    #[test]
    fn parses_sample_output() {
        let services = parse_list_units(SAMPLE).unwrap();
        assert_eq!(services.len(), 7);

        assert_eq!(
            services[0],
            ServiceRecord::new("accounts-daemon.service", "Accounts Service", ServiceStatus::Running)
        );
        assert_eq!(
            services[1],
            ServiceRecord::new(
                "apparmor.service",
                "Load AppArmor profiles",
                ServiceStatus::Stopped
            )
        );
        assert_eq!(services[2].status, ServiceStatus::Stopped);
        assert_eq!(services[3].status, ServiceStatus::StartPending);
        assert_eq!(services[4].status, ServiceStatus::StopPending);
        assert_eq!(services[4].display_name, "Dispatcher daemon for systemd-networkd");
        assert_eq!(services[6].status, ServiceStatus::Running);
    }

    #[test]
    fn description_keeps_inner_spacing() {
        let services =
            parse_list_units("foo.service loaded inactive dead Foo  -  Bar daemon\n").unwrap();
        assert_eq!(services[0].display_name, "Foo  -  Bar daemon");
    }

    #[test]
    fn missing_description_falls_back_to_unit_name() {
        let services = parse_list_units("bare.service loaded inactive dead\n").unwrap();
        assert_eq!(services[0].display_name, "bare.service");
    }

    #[test]
    fn blank_output_is_an_empty_inventory() {
        assert!(parse_list_units("").unwrap().is_empty());
        assert!(parse_list_units("\n   \n").unwrap().is_empty());
    }

    #[test]
    fn unknown_active_state_is_rejected() {
        let err = parse_list_units("odd.service loaded sleeping dead Odd\n").unwrap_err();
        match err {
            QueryError::UnknownState { service, value } => {
                assert_eq!(service, "odd.service");
                assert_eq!(value, "sleeping");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_line_is_rejected() {
        let err = parse_list_units("short.service loaded\n").unwrap_err();
        assert!(matches!(err, QueryError::Parse { .. }));
    }

    #[test]
    fn user_scope_adds_flag() {
        let command = SystemdInventory::new(ServiceScope::User).command();
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args[0], "--user");

        let command = SystemdInventory::new(ServiceScope::System).command();
        assert!(command.get_args().all(|arg| arg != "--user"));
    }
}
