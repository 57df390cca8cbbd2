//! Multi-line text area for editing mock bodies
//!
//! Cursor movement, insertion and deletion over a vector of lines, with a
//! line-number gutter when rendered.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

/// Actions the text area asks its owner to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Paste from the system clipboard
    PasteRequest,
}

/// Cursor position as (row, column) in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Cursor {
    row: usize,
    col: usize,
}

#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    cursor: Cursor,
    style: Style,
    cursor_style: Style,
    gutter_style: Style,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            style: Style::default(),
            cursor_style: Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
            gutter_style: Style::default().fg(Color::DarkGray),
        }
    }
}

impl TextArea {
    pub fn new(content: &str) -> Self {
        let mut area = Self::default();
        area.set_content(content);
        area
    }

    /// The full text, lines joined with `\n`
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the text and move the cursor to the start
    pub fn set_content(&mut self, content: &str) {
        self.lines = content.split('\n').map(String::from).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor = Cursor::default();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor position as (row, column)
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor.row, self.cursor.col)
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Insert text at the cursor, splitting on newlines
    pub fn paste(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    /// Handle a key, reporting whether the text changed and any action
    /// the owner has to carry out
    pub fn handle_key(&mut self, key: KeyEvent) -> (bool, Option<EditorAction>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Char('v'), true) => return (false, Some(EditorAction::PasteRequest)),
            (KeyCode::Char('k'), true) => {
                self.delete_line();
                return (true, None);
            }
            (KeyCode::Char(c), false) => self.insert_char(c),
            (KeyCode::Enter, _) => self.insert_newline(),
            (KeyCode::Tab, _) => self.paste("  "),
            (KeyCode::Backspace, _) => self.delete_before(),
            (KeyCode::Delete, _) => self.delete_after(),
            (KeyCode::Left, _) => {
                self.move_left();
                return (false, None);
            }
            (KeyCode::Right, _) => {
                self.move_right();
                return (false, None);
            }
            (KeyCode::Up, _) => {
                self.move_vertically(-1);
                return (false, None);
            }
            (KeyCode::Down, _) => {
                self.move_vertically(1);
                return (false, None);
            }
            (KeyCode::PageUp, _) => {
                self.move_vertically(-10);
                return (false, None);
            }
            (KeyCode::PageDown, _) => {
                self.move_vertically(10);
                return (false, None);
            }
            (KeyCode::Home, _) => {
                self.cursor.col = 0;
                return (false, None);
            }
            (KeyCode::End, _) => {
                self.cursor.col = self.line_len(self.cursor.row);
                return (false, None);
            }
            _ => return (false, None),
        }
        (true, None)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
    }

    fn move_vertically(&mut self, delta: isize) {
        let last = self.lines.len().saturating_sub(1) as isize;
        let row = (self.cursor.row as isize + delta).clamp(0, last) as usize;
        self.cursor.row = row;
        self.cursor.col = self.cursor.col.min(self.line_len(row));
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor.row];
        let at = Self::byte_index(line, self.cursor.col);
        line.insert(at, c);
        self.cursor.col += 1;
    }

    fn insert_newline(&mut self) {
        let line = &mut self.lines[self.cursor.row];
        let at = Self::byte_index(line, self.cursor.col);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor.row + 1, rest);
        self.cursor.row += 1;
        self.cursor.col = 0;
    }

    fn delete_before(&mut self) {
        if self.cursor.col > 0 {
            let line = &mut self.lines[self.cursor.row];
            let start = Self::byte_index(line, self.cursor.col - 1);
            let end = Self::byte_index(line, self.cursor.col);
            line.replace_range(start..end, "");
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            let current = self.lines.remove(self.cursor.row);
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
            self.lines[self.cursor.row].push_str(&current);
        }
    }

    fn delete_after(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.row) {
            let line = &mut self.lines[self.cursor.row];
            let start = Self::byte_index(line, self.cursor.col);
            let end = Self::byte_index(line, self.cursor.col + 1);
            line.replace_range(start..end, "");
        } else if self.cursor.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.row + 1);
            self.lines[self.cursor.row].push_str(&next);
        }
    }

    fn delete_line(&mut self) {
        if self.lines.len() > 1 {
            self.lines.remove(self.cursor.row);
            self.cursor.row = self.cursor.row.min(self.lines.len() - 1);
        } else {
            self.lines[0].clear();
        }
        self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
    }

    /// Render into `area`, drawing `block` around it and showing the
    /// cursor only when `focused`
    pub fn render_with_block(
        &self,
        area: Rect,
        buf: &mut Buffer,
        block: Option<Block>,
        focused: bool,
    ) {
        let inner = match block {
            Some(b) => {
                let inner = b.inner(area);
                b.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let gutter = self.lines.len().to_string().len() + 1;
        let text_x = inner.x + gutter as u16;
        let text_width = inner.width.saturating_sub(gutter as u16) as usize;
        let height = inner.height as usize;
        let scroll = self.cursor.row.saturating_sub(height.saturating_sub(1));

        for (i, line) in self.lines.iter().skip(scroll).take(height).enumerate() {
            let row = scroll + i;
            let y = inner.y + i as u16;

            buf.set_string(
                inner.x,
                y,
                format!("{:>w$} ", row + 1, w = gutter - 1),
                self.gutter_style,
            );

            let hscroll = if focused && row == self.cursor.row {
                self.cursor.col.saturating_sub(text_width.saturating_sub(1))
            } else {
                0
            };
            for (j, c) in line.chars().skip(hscroll).take(text_width).enumerate() {
                let style = if focused && row == self.cursor.row && j + hscroll == self.cursor.col {
                    self.cursor_style
                } else {
                    self.style
                };
                buf[(text_x + j as u16, y)].set_char(c).set_style(style);
            }

            if focused && row == self.cursor.row && self.cursor.col >= line.chars().count() {
                let x = text_x + (self.cursor.col - hscroll) as u16;
                if x < inner.x + inner.width {
                    buf[(x, y)].set_char(' ').set_style(self.cursor_style);
                }
            }
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for &TextArea {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_with_block(area, buf, None, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_newlines() {
        let mut area = TextArea::default();
        for c in "{}".chars() {
            area.handle_key(key(KeyCode::Char(c)));
        }
        area.handle_key(key(KeyCode::Left));
        area.handle_key(key(KeyCode::Enter));
        assert_eq!(area.content(), "{\n}");
        assert_eq!(area.cursor(), (1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut area = TextArea::new("ab\ncd");
        area.handle_key(key(KeyCode::Down));
        let (changed, _) = area.handle_key(key(KeyCode::Backspace));
        assert!(changed);
        assert_eq!(area.content(), "abcd");
        assert_eq!(area.cursor(), (0, 2));
    }

    #[test]
    fn test_content_round_trips_trailing_newline() {
        let area = TextArea::new("line\n");
        assert_eq!(area.content(), "line\n");
        assert!(TextArea::new("  \n ").is_blank());
    }

    #[test]
    fn test_multibyte_editing() {
        let mut area = TextArea::new("héllo");
        area.handle_key(key(KeyCode::End));
        area.handle_key(key(KeyCode::Backspace));
        area.paste("ø\nx");
        assert_eq!(area.content(), "héllø\nx");
    }

    #[test]
    fn test_paste_is_requested_from_owner() {
        let mut area = TextArea::default();
        let (changed, action) =
            area.handle_key(KeyEvent::new(KeyCode::Char('v'), KeyModifiers::CONTROL));
        assert!(!changed);
        assert_eq!(action, Some(EditorAction::PasteRequest));
    }
}
