//! Single-line field editing

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of feeding a key to a single-line field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    Changed,
    Unchanged,
    /// The key is not a text-editing key; the caller should handle it
    Ignored,
}

/// Append/backspace editing with `Ctrl+U` to clear, as in the dialog inputs
pub fn edit_line(value: &mut String, key: KeyEvent) -> LineEdit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => {
            if value.is_empty() {
                LineEdit::Unchanged
            } else {
                value.clear();
                LineEdit::Changed
            }
        }
        KeyCode::Char(_) if ctrl => LineEdit::Ignored,
        KeyCode::Char(c) => {
            value.push(c);
            LineEdit::Changed
        }
        KeyCode::Backspace => match value.pop() {
            Some(_) => LineEdit::Changed,
            None => LineEdit::Unchanged,
        },
        _ => LineEdit::Ignored,
    }
}
