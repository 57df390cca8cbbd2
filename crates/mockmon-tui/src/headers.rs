//! Editable list of header rows backing a mock's headers
//!
//! The list never exposes zero rows: removing the last row seeds a fresh
//! blank one, and loading an empty header map yields a single blank row.

use crate::api::Headers;

/// Stable handle to a row, valid until the row is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

/// One editable name/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    id: RowId,
    pub name: String,
    pub value: String,
}

impl HeaderRow {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// Ordered, mutable header rows
#[derive(Debug, Clone)]
pub struct HeaderListEditor {
    rows: Vec<HeaderRow>,
    next_id: u64,
}

impl Default for HeaderListEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderListEditor {
    /// Create an editor holding one blank row
    pub fn new() -> Self {
        let mut editor = Self {
            rows: Vec::new(),
            next_id: 0,
        };
        editor.add_blank();
        editor
    }

    /// Append a row and return its handle
    pub fn add_row(&mut self, name: impl Into<String>, value: impl Into<String>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(HeaderRow {
            id,
            name: name.into(),
            value: value.into(),
        });
        id
    }

    /// Append an empty row
    pub fn add_blank(&mut self) -> RowId {
        self.add_row("", "")
    }

    /// Remove a row, reseeding a blank one if the list would become empty.
    ///
    /// Returns `false` when the handle is unknown.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.rows.remove(index);
        if self.rows.is_empty() {
            self.add_blank();
        }
        true
    }

    /// Replace every row with the given headers (one blank row if empty)
    pub fn load(&mut self, headers: &Headers) {
        self.rows.clear();
        for (name, value) in headers.iter() {
            self.add_row(name, value);
        }
        if self.rows.is_empty() {
            self.add_blank();
        }
    }

    /// Clear back to a single blank row
    pub fn reset(&mut self) {
        self.load(&Headers::new());
    }

    /// Build the header map sent to the backend.
    ///
    /// Names are trimmed; rows with a blank name are skipped and later
    /// duplicates overwrite earlier ones.
    pub fn collect(&self) -> Headers {
        self.rows
            .iter()
            .filter_map(|row| {
                let name = row.name.trim();
                (!name.is_empty()).then(|| (name.to_string(), row.value.clone()))
            })
            .collect()
    }

    pub fn rows(&self) -> &[HeaderRow] {
        &self.rows
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut HeaderRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Drives the "no headers" placeholder; false in steady state
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_with_one_blank_row() {
        let editor = HeaderListEditor::new();
        assert_eq!(editor.len(), 1);
        assert!(editor.rows()[0].is_blank());
        assert!(editor.collect().is_empty());
    }

    #[test]
    fn test_removing_last_row_reseeds() {
        let mut editor = HeaderListEditor::new();
        let only = editor.rows()[0].id();
        editor.row_mut(only).unwrap().name = "X-Old".to_string();

        assert!(editor.remove_row(only));
        assert_eq!(editor.len(), 1);
        assert!(editor.rows()[0].is_blank());
        assert_ne!(editor.rows()[0].id(), only);
        assert!(!editor.remove_row(only));
    }

    #[test]
    fn test_collect_trims_and_skips_blank_names() {
        let mut editor = HeaderListEditor::new();
        editor.load(&Headers::new());
        let first = editor.rows()[0].id();
        editor.row_mut(first).unwrap().value = "orphan".to_string();
        editor.add_row("  X-Request-Id ", "abc");
        editor.add_row("   ", "ignored");

        let headers = editor.collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn test_collect_last_duplicate_wins() {
        let mut editor = HeaderListEditor::new();
        editor.add_row("Accept", "text/plain");
        editor.add_row("Accept ", "application/json");

        let headers = editor.collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_load_empty_map_yields_blank_row() {
        let mut editor = HeaderListEditor::new();
        editor.add_row("A", "1");
        editor.load(&Headers::new());
        assert_eq!(editor.len(), 1);
        assert!(editor.rows()[0].is_blank());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String, String),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            ("[a-z]{0,4}", "[a-z]{0,4}").prop_map(|(n, v)| Op::Add(n, v)),
            (0usize..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_never_zero_rows(ops in prop::collection::vec(op(), 0..64)) {
            let mut editor = HeaderListEditor::new();
            for op in ops {
                match op {
                    Op::Add(name, value) => {
                        editor.add_row(name, value);
                    }
                    Op::Remove(index) => {
                        let id = editor.rows()[index % editor.len()].id();
                        editor.remove_row(id);
                    }
                }
                prop_assert!(editor.len() >= 1);
                prop_assert!(!editor.is_empty());
            }
        }

        #[test]
        fn prop_load_collect_round_trip(
            map in prop::collection::btree_map("[A-Za-z][A-Za-z0-9-]{0,12}", ".{0,16}", 0..8)
        ) {
            let headers: Headers = map.into_iter().collect();
            let mut editor = HeaderListEditor::new();
            editor.load(&headers);
            prop_assert_eq!(editor.collect(), headers.clone());
            prop_assert_eq!(editor.collect(), editor.collect());
        }
    }
}
