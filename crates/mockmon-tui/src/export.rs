//! Request log export to JSON files

use crate::api::LogEntry;
use crate::error::ConsoleError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// `request-logs-<timestamp>.json`, with `:` and `.` in the timestamp
/// replaced so the name is valid on every filesystem
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("request-logs-{}.json", stamp)
}

/// Write `entries` as pretty-printed JSON into `dir`, returning the file path
pub fn write_logs(
    dir: &Path,
    entries: &[LogEntry],
    now: DateTime<Utc>,
) -> Result<PathBuf, ConsoleError> {
    let path = dir.join(export_file_name(now));
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(&path, json).map_err(|source| ConsoleError::Export {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = entries.len(), "exported request logs");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Headers;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(45)
    }

    #[test]
    fn test_file_name_is_filesystem_safe() {
        assert_eq!(
            export_file_name(now()),
            "request-logs-2024-05-01T10-20-30-045Z.json"
        );
    }

    #[test]
    fn test_write_logs_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![LogEntry {
            id: "7".to_string(),
            timestamp: "2024-05-01T10:00:00".to_string(),
            method: "POST".to_string(),
            path: "/orders".to_string(),
            status_code: 201,
            source: "mock".to_string(),
            request_headers: [("Content-Type", "application/json")].into_iter().collect(),
            request_body: Some("{}".to_string()),
            response_headers: Headers::new(),
            response_body: None,
        }];

        let path = write_logs(dir.path(), &entries, now()).unwrap();

        assert!(path.starts_with(dir.path()));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"));
        let back: Vec<LogEntry> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_logs(&missing, &[], now()).unwrap_err();
        assert!(matches!(err, ConsoleError::Export { .. }));
    }
}
