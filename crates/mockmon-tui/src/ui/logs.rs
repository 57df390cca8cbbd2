//! Request log view
//!
//! One row per log entry in the order the server returned them. Expanded
//! rows carry their request/response detail underneath.

use crate::api::{Backend, Headers};
use crate::app::App;
use crate::body_mode::pretty_json;
use crate::logs::{format_timestamp, LogRow};
use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let theme = &app.theme;
    let logs = &app.console.logs;
    let selected = app.selected_log_index();

    let items: Vec<ListItem> = logs
        .rows()
        .enumerate()
        .map(|(i, row)| ListItem::new(row_text(theme, row, selected == Some(i))))
        .collect();

    let updated = match app.last_poll {
        Some(at) => format!(" updated {}s ago", at.elapsed().as_secs()),
        None => String::new(),
    };
    let title = format!(" Request Logs ({}){} ", logs.len(), updated);

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);

    if logs.is_empty() {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let centered = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height.min(1),
            ..inner
        };
        let paragraph = Paragraph::new("No requests recorded yet.")
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, centered);
    }
}

fn row_text<'a>(theme: &Theme, row: &'a LogRow, is_selected: bool) -> Text<'a> {
    let entry = &row.entry;
    let marker = match (is_selected, row.open) {
        (true, true) => " ▼ ",
        (true, false) => " ▶ ",
        (false, true) => " ▽ ",
        (false, false) => " ▷ ",
    };
    let base = if is_selected {
        Style::default().bg(theme.highlight_bg).fg(theme.highlight_fg)
    } else {
        Style::default()
    };

    let summary = Line::from(vec![
        Span::styled(marker, base.fg(theme.focus)),
        Span::styled(format_timestamp(&entry.timestamp), base.fg(theme.muted)),
        Span::styled(" │ ", base.fg(theme.border)),
        Span::styled(
            format!("{:<7}", entry.method),
            base.fg(theme.method_color(&entry.method))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<40}", super::truncate(&entry.path, 40)),
            base.fg(theme.fg),
        ),
        Span::styled(" │ ", base.fg(theme.border)),
        Span::styled(
            entry.status_code.to_string(),
            base.fg(theme.status_color(entry.status_code)),
        ),
        Span::styled(" │ ", base.fg(theme.border)),
        Span::styled(entry.source.as_str(), base.fg(theme.source_color(&entry.source))),
    ]);

    let mut lines = vec![summary];
    if row.open {
        detail(theme, &mut lines, "Request headers", &headers_json(&entry.request_headers));
        detail(theme, &mut lines, "Request body", &body_text(entry.request_body.as_deref()));
        detail(theme, &mut lines, "Response headers", &headers_json(&entry.response_headers));
        detail(theme, &mut lines, "Response body", &body_text(entry.response_body.as_deref()));
        lines.push(Line::from(""));
    }
    Text::from(lines)
}

fn detail(theme: &Theme, lines: &mut Vec<Line<'_>>, label: &'static str, content: &str) {
    lines.push(Line::from(Span::styled(
        format!("     {}", label),
        Style::default()
            .fg(theme.key_fg)
            .add_modifier(Modifier::BOLD),
    )));
    for line in content.lines() {
        lines.push(Line::from(Span::styled(
            format!("       {}", line),
            Style::default().fg(theme.fg),
        )));
    }
}

fn headers_json(headers: &Headers) -> String {
    if headers.is_empty() {
        return "{}".to_string();
    }
    serde_json::to_string_pretty(headers).unwrap_or_else(|_| "{}".to_string())
}

/// Bodies are shown pretty-printed when they are JSON, verbatim otherwise
fn body_text(body: Option<&str>) -> String {
    match body {
        None => String::new(),
        Some(text) => match pretty_json(text) {
            Ok(Some(pretty)) => pretty,
            _ => text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text() {
        assert_eq!(body_text(None), "");
        assert_eq!(body_text(Some(r#"{"a":1}"#)), "{\n  \"a\": 1\n}");
        assert_eq!(body_text(Some("plain")), "plain");
    }

    #[test]
    fn test_headers_json_keeps_order() {
        let headers: Headers = [("X-B", "2"), ("X-A", "1")].into_iter().collect();
        let json = headers_json(&headers);
        assert!(json.find("X-B").unwrap() < json.find("X-A").unwrap());
        assert_eq!(headers_json(&Headers::new()), "{}");
    }
}
