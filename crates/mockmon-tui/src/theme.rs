//! Color scheme for the console

use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub focus: Color,
    /// Key hints in the command bar
    pub key_fg: Color,
    /// Labels next to key hints
    pub cmd_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            highlight_bg: Color::Blue,
            highlight_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            border: Color::Gray,
            header_bg: Color::Cyan,
            header_fg: Color::Black,
            focus: Color::Yellow,
            key_fg: Color::Cyan,
            cmd_fg: Color::Gray,
        }
    }
}

impl Theme {
    /// Color for an HTTP status code by class
    pub fn status_color(&self, status: u16) -> Color {
        match status {
            200..=299 => self.success,
            300..=399 => Color::Cyan,
            400..=499 => self.warning,
            500..=599 => self.error,
            _ => self.muted,
        }
    }

    /// Color for a log entry's source label
    pub fn source_color(&self, source: &str) -> Color {
        match source.to_ascii_lowercase().as_str() {
            "mock" => self.success,
            "proxy" => Color::Magenta,
            _ => self.muted,
        }
    }

    pub fn method_color(&self, method: &str) -> Color {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Color::Green,
            "POST" => Color::Yellow,
            "PUT" | "PATCH" => Color::Blue,
            "DELETE" => Color::Red,
            _ => self.fg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(204), theme.success);
        assert_eq!(theme.status_color(404), theme.warning);
        assert_eq!(theme.status_color(503), theme.error);
        assert_eq!(theme.status_color(42), theme.muted);
    }
}
