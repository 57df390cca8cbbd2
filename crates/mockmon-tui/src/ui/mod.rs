//! UI rendering for the TUI

mod dialogs;
mod editor;
mod help;
mod logs;
mod mocks;

use crate::api::Backend;
use crate::app::{App, Overlay, StatusLevel, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

/// Main draw function
pub fn draw<B: Backend>(frame: &mut Frame, app: &App<B>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);

    match app.view {
        View::Mocks => mocks::draw_list(frame, app, chunks[2]),
        View::Editor => editor::draw(frame, app, chunks[2]),
        View::Logs => logs::draw(frame, app, chunks[2]),
    }

    draw_status_bar(frame, app, chunks[3]);

    // Draw overlays on top
    match &app.overlay {
        Overlay::Help => help::draw_overlay(frame, app.help_scroll),
        Overlay::Confirm { message, .. } => dialogs::draw_confirm(frame, message),
        Overlay::Error { message } => dialogs::draw_error(frame, message),
        Overlay::Success { message } => dialogs::draw_success(frame, message),
        Overlay::ProxyInput { value } => dialogs::draw_proxy_input(frame, app, value),
        Overlay::None => {}
    }
}

/// Draw the header bar
fn draw_header<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let connection_status = if app.is_connected() {
        Span::styled("● Connected", Style::default().fg(app.theme.success))
    } else {
        Span::styled("○ Disconnected", Style::default().fg(app.theme.error))
    };

    let loading = if app.is_loading {
        Span::styled(" ⟳", Style::default().fg(app.theme.warning))
    } else {
        Span::raw("")
    };

    let refresh = if app.auto_refresh {
        Span::styled(" auto-refresh", Style::default().fg(app.theme.success))
    } else {
        Span::styled(" paused", Style::default().fg(app.theme.muted))
    };

    let proxy = match &app.console.proxy().target_url {
        Some(url) => Span::styled(format!(" proxy → {}", url), Style::default().fg(app.theme.fg)),
        None => Span::styled(" proxy off", Style::default().fg(app.theme.muted)),
    };

    let title = Line::from(vec![
        Span::styled(
            " Mockmon ",
            Style::default()
                .fg(app.theme.header_fg)
                .bg(app.theme.header_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        connection_status,
        loading,
        Span::raw(" │ "),
        Span::styled(&app.api_url, Style::default().fg(app.theme.muted)),
        Span::raw(" │"),
        proxy,
        Span::raw(" │"),
        refresh,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(title).block(block), area);
}

fn draw_tabs<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let count = match view {
                View::Mocks => format!(" ({})", app.console.mocks().len()),
                View::Logs => format!(" ({})", app.console.logs.len()),
                View::Editor => String::new(),
            };
            Line::from(format!("{} {}{}", i + 1, view.title(), count))
        })
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(app.theme.muted))
        .highlight_style(
            Style::default()
                .fg(app.theme.focus)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// Draw the status bar: the latest message, or the key hints for the view
fn draw_status_bar<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    let line = if let Some((msg, level, _)) = &app.status_message {
        let color = match level {
            StatusLevel::Info => app.theme.fg,
            StatusLevel::Success => app.theme.success,
            StatusLevel::Warning => app.theme.warning,
            StatusLevel::Error => app.theme.error,
        };
        Line::from(Span::styled(format!(" {}", msg), Style::default().fg(color)))
    } else {
        build_command_line(get_commands(app.view), app)
    };

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

/// Command definition (key, label)
type Command = (&'static str, &'static str);

/// Build a command line with [key] notation and separators
fn build_command_line<B: Backend>(commands: &[Command], app: &App<B>) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, label)) in commands.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(app.theme.border)));
        }
        spans.push(Span::styled(
            format!("[{}]", key),
            Style::default()
                .fg(app.theme.key_fg)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(app.theme.cmd_fg),
        ));
    }
    Line::from(spans)
}

/// Context-sensitive commands as (key, label) pairs
fn get_commands(view: View) -> &'static [Command] {
    match view {
        View::Mocks => &[
            ("n", "New"),
            ("e", "Edit"),
            ("d", "Del"),
            ("D", "DelAll"),
            ("p", "Proxy"),
            ("r", "Refresh"),
            ("S", "Shutdown"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        View::Editor => &[
            ("Tab", "Next"),
            ("^S", "Save"),
            ("^J", "JSON"),
            ("^F", "Format"),
            ("^A", "AddHdr"),
            ("^D", "DelHdr"),
            ("^N", "New"),
            ("Esc", "Back"),
        ],
        View::Logs => &[
            ("Enter", "Details"),
            ("y", "Copy"),
            ("x", "Export"),
            ("a", "AutoRefresh"),
            ("r", "Refresh"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    }
}

/// Calculate a centered rect for modals
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Truncate a string to `max` characters with an ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{log_entry, stored_mock, FakeBackend};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App<FakeBackend>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    async fn connected_app() -> App<FakeBackend> {
        let backend = FakeBackend::with_mocks(vec![stored_mock("GET", "/users")]);
        backend.logs.lock().unwrap().push(log_entry("1", 404));
        let mut app = App::with_backend(backend, &Config::default());
        app.connect().await;
        app
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("/short", 10), "/short");
        assert_eq!(truncate("/a/very/long/path", 8), "/a/very…");
    }

    #[tokio::test]
    async fn test_draws_every_view() {
        let mut app = connected_app().await;

        let text = render(&app);
        assert!(text.contains("Mockmon"));
        assert!(text.contains("/users"));

        app.start_edit();
        let text = render(&app);
        assert!(text.contains("Edit mock GET /users"));

        app.view = View::Logs;
        let id = app.selected_log.clone().unwrap();
        app.console.logs.set_open(&id, true);
        let text = render(&app);
        assert!(text.contains("/items/1"));
        assert!(text.contains("Request headers"));
    }

    #[tokio::test]
    async fn test_draws_overlays() {
        let mut app = connected_app().await;
        app.confirm_delete_mock();
        assert!(render(&app).contains("Delete mock GET /users?"));

        app.overlay = Overlay::Help;
        assert!(render(&app).contains("Help"));
    }
}
