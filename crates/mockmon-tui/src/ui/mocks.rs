//! Mock list view

use crate::api::Backend;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Draw the mock list view
pub fn draw_list<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let theme = &app.theme;
    let mocks = app.console.mocks();

    let items: Vec<ListItem> = mocks
        .iter()
        .enumerate()
        .map(|(i, mock)| {
            let is_selected = app.mock_list_state.selected() == Some(i);
            let mut spans = vec![
                Span::styled(
                    if is_selected { " ▶ " } else { "   " },
                    Style::default().fg(theme.highlight_bg),
                ),
                Span::styled(
                    format!("{:<7}", mock.method),
                    Style::default()
                        .fg(theme.method_color(&mock.method))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" │ ", Style::default().fg(theme.border)),
                Span::styled(
                    format!("{:<36}", super::truncate(&mock.path, 36)),
                    Style::default().fg(theme.fg),
                ),
                Span::styled(" │ ", Style::default().fg(theme.border)),
                Span::styled(
                    format!("{}", mock.status_code),
                    Style::default().fg(theme.status_color(mock.status_code)),
                ),
            ];
            if mock.delay_ms > 0 {
                spans.push(Span::styled(
                    format!(" │ +{}ms", mock.delay_ms),
                    Style::default().fg(theme.warning),
                ));
            }
            if !mock.headers.is_empty() {
                spans.push(Span::styled(
                    format!(" │ {} hdr", mock.headers.len()),
                    Style::default().fg(theme.muted),
                ));
            }
            if let Some(ct) = &mock.content_type {
                spans.push(Span::styled(
                    format!(" │ {}", ct),
                    Style::default().fg(theme.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Mocks ({}) ", mocks.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .fg(theme.highlight_fg),
        );

    frame.render_stateful_widget(list, area, &mut app.mock_list_state.clone());

    if mocks.is_empty() {
        let msg = if app.is_connected() {
            "No mocks defined. Press 'n' to create one."
        } else {
            "Not connected. Is the mock server running? Press 'r' to retry."
        };

        let inner = Block::default().borders(Borders::ALL).inner(area);
        let centered = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height.min(1),
            ..inner
        };
        let paragraph = Paragraph::new(msg)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, centered);
    }
}
