//! Request log view state
//!
//! Each poll delivers the complete log list. `LogReconciler` keeps one row
//! per entry id across polls so that a row the user expanded stays expanded
//! while its data is refreshed in place.

use crate::api::LogEntry;
use std::collections::{HashMap, HashSet};

/// A displayed log entry plus its expansion state
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub entry: LogEntry,
    pub open: bool,
}

/// What a reconcile pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileSummary {
    pub fn is_unchanged(&self) -> bool {
        self.created == 0 && self.removed == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogReconciler {
    rows: HashMap<String, LogRow>,
    order: Vec<String>,
}

impl LogReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the rows in line with a freshly fetched list.
    ///
    /// Ids missing from `entries` are dropped, known ids are updated without
    /// touching their open flag, and new ids start closed. Display order
    /// follows `entries`; a repeated id keeps its first position and its
    /// last data.
    pub fn reconcile(&mut self, entries: Vec<LogEntry>) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let mut seen = HashSet::with_capacity(entries.len());
        let mut order = Vec::with_capacity(entries.len());

        for entry in entries {
            let id = entry.id.clone();
            if seen.insert(id.clone()) {
                order.push(id.clone());
            }
            match self.rows.get_mut(&id) {
                Some(row) => {
                    row.entry = entry;
                    summary.updated += 1;
                }
                None => {
                    self.rows.insert(id, LogRow { entry, open: false });
                    summary.created += 1;
                }
            }
        }

        let before = self.rows.len();
        self.rows.retain(|id, _| seen.contains(id));
        summary.removed = before - self.rows.len();
        self.order = order;

        if !summary.is_unchanged() {
            tracing::debug!(
                created = summary.created,
                removed = summary.removed,
                total = self.order.len(),
                "reconciled request logs"
            );
        }
        summary
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &LogRow> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&LogRow> {
        self.rows.get(id)
    }

    pub fn row_at(&self, index: usize) -> Option<&LogRow> {
        self.order.get(index).and_then(|id| self.rows.get(id))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|known| known == id)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.rows.get(id).is_some_and(|row| row.open)
    }

    pub fn set_open(&mut self, id: &str, open: bool) -> bool {
        match self.rows.get_mut(id) {
            Some(row) => {
                row.open = open;
                true
            }
            None => false,
        }
    }

    /// Flip a row open/closed; returns the new state, `None` if unknown
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let row = self.rows.get_mut(id)?;
        row.open = !row.open;
        Some(row.open)
    }

    /// Current entries in display order, for export
    pub fn entries(&self) -> Vec<LogEntry> {
        self.rows().map(|row| row.entry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM:SS.mmm`.
///
/// The backend sends ISO-8601 with or without an offset; anything that does
/// not parse is shown as received.
pub fn format_timestamp(raw: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&chrono::Utc).format(FORMAT).to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format(FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Headers;

    fn entry(id: &str, status: u16) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            timestamp: "2024-05-01T10:00:00".to_string(),
            method: "GET".to_string(),
            path: format!("/{}", id),
            status_code: status,
            source: "mock".to_string(),
            request_headers: Headers::new(),
            request_body: None,
            response_headers: Headers::new(),
            response_body: None,
        }
    }

    fn ids(logs: &LogReconciler) -> Vec<&str> {
        logs.rows().map(|row| row.entry.id.as_str()).collect()
    }

    #[test]
    fn test_first_reconcile_creates_closed_rows() {
        let mut logs = LogReconciler::new();
        let summary = logs.reconcile(vec![entry("a", 200), entry("b", 404)]);

        assert_eq!(summary.created, 2);
        assert_eq!(ids(&logs), vec!["a", "b"]);
        assert!(!logs.is_open("a"));
        assert!(!logs.is_open("b"));
    }

    #[test]
    fn test_open_row_survives_refresh() {
        let mut logs = LogReconciler::new();
        logs.reconcile(vec![entry("a", 200), entry("b", 200)]);
        assert_eq!(logs.toggle("b"), Some(true));

        let summary = logs.reconcile(vec![entry("c", 201), entry("a", 200), entry("b", 500)]);

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 2);
        assert_eq!(ids(&logs), vec!["c", "a", "b"]);
        assert!(logs.is_open("b"));
        assert!(!logs.is_open("c"));
        assert_eq!(logs.get("b").unwrap().entry.status_code, 500);
    }

    #[test]
    fn test_missing_ids_are_removed() {
        let mut logs = LogReconciler::new();
        logs.reconcile(vec![entry("a", 200), entry("b", 200)]);
        logs.set_open("a", true);

        let summary = logs.reconcile(vec![entry("b", 200)]);

        assert_eq!(summary.removed, 1);
        assert_eq!(ids(&logs), vec!["b"]);
        assert!(logs.get("a").is_none());

        // A returning id starts over, closed
        logs.reconcile(vec![entry("a", 200), entry("b", 200)]);
        assert!(!logs.is_open("a"));
    }

    #[test]
    fn test_empty_list_clears_everything() {
        let mut logs = LogReconciler::new();
        logs.reconcile(vec![entry("a", 200)]);
        let summary = logs.reconcile(Vec::new());
        assert_eq!(summary.removed, 1);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_duplicate_ids_yield_one_row() {
        let mut logs = LogReconciler::new();
        logs.reconcile(vec![entry("a", 200), entry("b", 200), entry("a", 418)]);

        assert_eq!(ids(&logs), vec!["a", "b"]);
        assert_eq!(logs.get("a").unwrap().entry.status_code, 418);
    }

    #[test]
    fn test_unknown_ids() {
        let mut logs = LogReconciler::new();
        assert_eq!(logs.toggle("nope"), None);
        assert!(!logs.set_open("nope", true));
        assert_eq!(logs.position("nope"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2024-05-01T10:00:00.123456"),
            "2024-05-01 10:00:00.123"
        );
        assert_eq!(
            format_timestamp("2024-05-01T10:00:00Z"),
            "2024-05-01 10:00:00.000"
        );
        assert_eq!(
            format_timestamp("2024-05-01T12:30:00.5+02:00"),
            "2024-05-01 10:30:00.500"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
