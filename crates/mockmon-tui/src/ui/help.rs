//! Help overlay with scroll support

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Draw the help overlay scrolled down by `scroll` lines
pub fn draw_overlay(frame: &mut Frame, scroll: u16) {
    let area = super::centered_rect(70, 85, frame.area());
    frame.render_widget(Clear, area);

    let help_text = build_help_text();
    let total_lines = help_text.len() as u16;
    let visible_height = area.height.saturating_sub(2);
    let max_scroll = total_lines.saturating_sub(visible_height);
    let scroll = scroll.min(max_scroll);

    let block = Block::default()
        .title(" Mockmon Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL);

    let paragraph = Paragraph::new(help_text).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if max_scroll > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut state = ScrollbarState::new(max_scroll as usize).position(scroll as usize);
        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut state);
    }
}

fn build_help_text() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        section_header("GLOBAL"),
        Line::from(""),
        help_line("1 / 2 / 3", "Mocks / Editor / Request logs"),
        help_line("Tab", "Switch between mocks and logs"),
        help_line("r", "Reload server info, mocks and logs"),
        help_line("a", "Toggle automatic log refresh"),
        help_line("p", "Set or clear the proxy target"),
        help_line("S (Shift+s)", "Shut down the mock server"),
        help_line("?", "Toggle this help"),
        help_line("q / Ctrl+C", "Quit"),
        Line::from(""),
        section_header("MOCKS"),
        Line::from(""),
        help_line("j / ↓, k / ↑", "Move selection"),
        help_line("n", "Create a new mock"),
        help_line("Enter / e", "Edit selected mock"),
        help_line("d", "Delete selected mock"),
        help_line("D (Shift+d)", "Delete all mocks"),
        Line::from(""),
        section_header("EDITOR"),
        Line::from(""),
        help_line("Tab / Shift+Tab", "Next / previous field"),
        help_line("←/→", "Change method"),
        help_line("Ctrl+S", "Save mock"),
        help_line("Ctrl+J", "Toggle JSON body mode"),
        help_line("Ctrl+F", "Format body as JSON"),
        help_line("Ctrl+A", "Add header row"),
        help_line("Ctrl+D", "Remove focused header row"),
        help_line("Ctrl+N", "Discard and start a new mock"),
        help_line("Ctrl+U", "Clear single-line field"),
        help_line("Ctrl+K", "Delete body line"),
        help_line("Ctrl+V", "Paste into body"),
        help_line("Esc", "Back to mocks (form is kept)"),
        Line::from(""),
        section_header("REQUEST LOGS"),
        Line::from(""),
        help_line("j / ↓, k / ↑", "Move selection"),
        help_line("Enter / Space", "Expand or collapse details"),
        help_line("y", "Copy entry as JSON"),
        help_line("x", "Export logs to a JSON file"),
        Line::from(""),
        Line::from(Span::styled(
            "  [↑/↓] scroll  [Esc/?] close",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ]
}

fn section_header(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(desc),
    ])
}
