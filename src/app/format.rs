// Turns service records into log lines, and back.

use chrono::NaiveDateTime;

use super::model::{LogEntry, RunSeparator, ServiceRecord, TIMESTAMP_FORMAT};

pub const NO_RESULTS_LINE: &str = "No stopped services found at this time.";

const SEPARATOR_RULE: &str = "=======================";
const FIELD_DELIMITER: &str = " - ";

/// `[{timestamp}] {name} - {display_name} - {status}`
pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.service_name,
        entry.display_name,
        entry.status
    )
}

pub fn format_separator(separator: &RunSeparator) -> String {
    format!(
        "{SEPARATOR_RULE} {} {SEPARATOR_RULE}",
        separator.timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Keeps the stopped records and orders them by name.
///
/// Names are compared byte by byte, so the output doesn't depend on locale or
/// on the order the OS enumerated services in.
pub fn stopped_entries(
    records: impl IntoIterator<Item = ServiceRecord>,
    timestamp: NaiveDateTime,
) -> Vec<LogEntry> {
    let mut stopped: Vec<ServiceRecord> = records.into_iter().filter(|r| r.is_stopped()).collect();
    stopped.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

    stopped
        .into_iter()
        .map(|record| LogEntry::new(timestamp, record))
        .collect()
}

/// Parses a line produced by [`format_entry`].
///
/// The name is taken up to the first delimiter and the status after the last
/// one, so a display name containing `" - "` still parses.
pub fn parse_entry(line: &str) -> Option<LogEntry> {
    let rest = line.strip_prefix('[')?;
    let (timestamp, rest) = rest.split_once("] ")?;
    let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()?;

    let (service_name, rest) = rest.split_once(FIELD_DELIMITER)?;
    let (display_name, status) = rest.rsplit_once(FIELD_DELIMITER)?;

    Some(LogEntry {
        timestamp,
        service_name: service_name.to_string(),
        display_name: display_name.to_string(),
        status: status.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::model::ServiceStatus;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap()
    }

    #[test]
    fn entry_line_layout() {
        let entry = LogEntry::new(
            timestamp(),
            ServiceRecord::new("Spooler", "Print Spooler", ServiceStatus::Stopped),
        );
        assert_eq!(
            format_entry(&entry),
            "[2024-03-09 07:05:01] Spooler - Print Spooler - Stopped"
        );
    }

    #[test]
    fn separator_layout() {
        let line = format_separator(&RunSeparator {
            timestamp: timestamp(),
        });
        assert_eq!(
            line,
            "======================= 2024-03-09 07:05:01 ======================="
        );
    }

    #[test]
    fn filters_and_sorts_ordinally() {
        let records = vec![
            ServiceRecord::new("zeta", "Zeta", ServiceStatus::Stopped),
            ServiceRecord::new("Beta", "Beta", ServiceStatus::Running),
            ServiceRecord::new("alpha", "alpha", ServiceStatus::Stopped),
            ServiceRecord::new("Zulu", "Zulu", ServiceStatus::Stopped),
            ServiceRecord::new("Alpha", "Alpha", ServiceStatus::Stopped),
        ];
        let names: Vec<String> = stopped_entries(records, timestamp())
            .into_iter()
            .map(|e| e.service_name)
            .collect();
        // uppercase sorts before lowercase in byte order
        assert_eq!(names, ["Alpha", "Zulu", "alpha", "zeta"]);
    }

    #[test]
    fn entries_share_the_run_timestamp() {
        let records = vec![
            ServiceRecord::new("a", "A", ServiceStatus::Stopped),
            ServiceRecord::new("b", "B", ServiceStatus::Stopped),
        ];
        assert!(
            stopped_entries(records, timestamp())
                .iter()
                .all(|e| e.timestamp == timestamp())
        );
    }

    #[test]
    fn parse_recovers_formatted_entry() {
        for status in ServiceStatus::ALL {
            let entry = LogEntry::new(
                timestamp(),
                ServiceRecord::new("wuauserv", "Windows Update", status),
            );
            assert_eq!(parse_entry(&format_entry(&entry)), Some(entry));
        }
    }

    #[test]
    fn parse_rejects_other_lines() {
        assert_eq!(parse_entry(NO_RESULTS_LINE), None);
        assert_eq!(
            parse_entry(&format_separator(&RunSeparator {
                timestamp: timestamp()
            })),
            None
        );
        assert_eq!(parse_entry("[2024-03-09 07:05:01] a - b - Sleeping"), None);
        assert_eq!(parse_entry(""), None);
    }
}
