// Reads the service inventory from PowerShell's `Get-Service`.

use std::process::Command;

use serde::Deserialize;

use super::inventory::{ServiceInventory, run_query};
use super::model::{ServiceRecord, ServiceStatus};
use crate::error::QueryError;

// Console output otherwise uses the OEM code page, which mangles non-ASCII display names.
const GET_SERVICE: &str = "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; \
    Get-Service | Select-Object Name, DisplayName, Status | ConvertTo-Json";

pub struct PowerShellInventory;

impl PowerShellInventory {
    fn command(&self) -> Command {
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command", GET_SERVICE]);
        cmd
    }
}

impl ServiceInventory for PowerShellInventory {
    fn list_services(&self) -> Result<Vec<ServiceRecord>, QueryError> {
        let stdout = run_query(&mut self.command())?;
        parse_get_service(&stdout)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PowerShellService {
    name: String,
    display_name: Option<String>,
    status: StatusValue,
}

/// `ServiceControllerStatus` is serialized as a number by Windows PowerShell
/// and may come through as a name with `-EnumsAsStrings`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusValue {
    Code(u32),
    Name(String),
}

/// ConvertTo-Json emits a bare object when there is only one service.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<PowerShellService>),
    One(PowerShellService),
}

pub fn parse_get_service(stdout: &str) -> Result<Vec<ServiceRecord>, QueryError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(Vec::new());
    }

    let services = match serde_json::from_str(stdout) {
        Ok(OneOrMany::Many(services)) => services,
        Ok(OneOrMany::One(service)) => vec![service],
        Err(e) => {
            return Err(QueryError::Parse {
                command: "Get-Service".to_string(),
                reason: e.to_string(),
            });
        }
    };

    services
        .into_iter()
        .map(|service| -> Result<ServiceRecord, QueryError> {
            let status = status_from_value(&service.name, &service.status)?;
            let display_name = service
                .display_name
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| service.name.clone());
            Ok(ServiceRecord::new(service.name, display_name, status))
        })
        .collect()
}

fn status_from_value(service: &str, value: &StatusValue) -> Result<ServiceStatus, QueryError> {
    let status = match value {
        StatusValue::Code(1) => Some(ServiceStatus::Stopped),
        StatusValue::Code(2) => Some(ServiceStatus::StartPending),
        StatusValue::Code(3) => Some(ServiceStatus::StopPending),
        StatusValue::Code(4) => Some(ServiceStatus::Running),
        StatusValue::Code(5 | 6) => Some(ServiceStatus::Unknown),
        StatusValue::Code(7) => Some(ServiceStatus::Paused),
        StatusValue::Code(_) => None,
        StatusValue::Name(name) => match name.as_str() {
            "ContinuePending" | "PausePending" => Some(ServiceStatus::Unknown),
            other => other.parse().ok(),
        },
    };

    status.ok_or_else(|| QueryError::UnknownState {
        service: service.to_string(),
        value: match value {
            StatusValue::Code(code) => code.to_string(),
            StatusValue::Name(name) => name.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_forces_utf8_output() {
        let cmd = PowerShellInventory.command();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args[..3], ["-NoProfile", "-NonInteractive", "-Command"]);
        assert!(args[3].starts_with("[Console]::OutputEncoding = [System.Text.Encoding]::UTF8;"));
        assert!(args[3].ends_with("Get-Service | Select-Object Name, DisplayName, Status | ConvertTo-Json"));
    }

    #[test]
    fn non_ascii_display_names_survive() {
        let json = r#"{"Name":"Spooler","DisplayName":"Druckwarteschlange für Geräte","Status":1}"#;
        let records = parse_get_service(json).unwrap();
        assert_eq!(records[0].display_name, "Druckwarteschlange für Geräte");
    }

    #[test]
    fn parses_numeric_statuses() {
        let json = r#"[
            {"Name": "Spooler", "DisplayName": "Print Spooler", "Status": 4},
            {"Name": "wuauserv", "DisplayName": "Windows Update", "Status": 1},
            {"Name": "BITS", "DisplayName": "Background Intelligent Transfer Service", "Status": 2},
            {"Name": "Paused1", "DisplayName": "Paused One", "Status": 7},
            {"Name": "Cont", "DisplayName": "Continuing", "Status": 5}
        ]"#;
        let services = parse_get_service(json).unwrap();
        let statuses: Vec<_> = services.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            [
                ServiceStatus::Running,
                ServiceStatus::Stopped,
                ServiceStatus::StartPending,
                ServiceStatus::Paused,
                ServiceStatus::Unknown,
            ]
        );
        assert_eq!(services[1].display_name, "Windows Update");
    }

    #[test]
    fn parses_named_statuses() {
        let json = r#"[
            {"Name": "a", "DisplayName": "A", "Status": "Stopped"},
            {"Name": "b", "DisplayName": "B", "Status": "StopPending"},
            {"Name": "c", "DisplayName": "C", "Status": "PausePending"}
        ]"#;
        let statuses: Vec<_> = parse_get_service(json)
            .unwrap()
            .into_iter()
            .map(|s| s.status)
            .collect();
        assert_eq!(
            statuses,
            [
                ServiceStatus::Stopped,
                ServiceStatus::StopPending,
                ServiceStatus::Unknown
            ]
        );
    }

    #[test]
    fn single_object_is_accepted() {
        let json = r#"{"Name": "only", "DisplayName": null, "Status": 1}"#;
        let services = parse_get_service(json).unwrap();
        assert_eq!(
            services,
            [ServiceRecord::new("only", "only", ServiceStatus::Stopped)]
        );
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        let json = r#"[{"Name": "x", "DisplayName": "X", "Status": 42}]"#;
        match parse_get_service(json).unwrap_err() {
            QueryError::UnknownState { service, value } => {
                assert_eq!(service, "x");
                assert_eq!(value, "42");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_get_service("Get-Service : Access denied").unwrap_err(),
            QueryError::Parse { .. }
        ));
    }

    #[test]
    fn empty_output_is_an_empty_inventory() {
        assert!(parse_get_service("  \r\n").unwrap().is_empty());
    }
}
