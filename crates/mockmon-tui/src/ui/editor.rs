//! Mock editor form

use super::dialogs::draw_input_field;
use crate::api::Backend;
use crate::app::{App, EditorField, HeaderColumn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Most header rows shown before the list scrolls
const MAX_VISIBLE_HEADERS: usize = 6;

const NAME_WIDTH: usize = 28;

pub fn draw<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let editor = &app.console.editor;

    let block = Block::default()
        .title(format!(" {} ", editor.caption()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_rows = editor.headers.len().min(MAX_VISIBLE_HEADERS) as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Method, path, status, delay
            Constraint::Length(3),               // Content type
            Constraint::Length(header_rows + 2), // Headers
            Constraint::Min(4),                  // Body
            Constraint::Length(1),               // Field error
        ])
        .split(inner);

    draw_request_line(frame, app, rows[0]);
    draw_content_type(frame, app, rows[1]);
    draw_headers(frame, app, rows[2]);
    draw_body(frame, app, rows[3]);

    if let Some((_, message)) = &app.field_error {
        let line = Paragraph::new(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.error),
        ));
        frame.render_widget(line, rows[4]);
    }
}

fn focused<B: Backend>(app: &App<B>, field: EditorField) -> bool {
    app.editor_field == field
}

/// Label with an error marker when the field failed validation
fn label<B: Backend>(app: &App<B>, field: EditorField, text: &str) -> String {
    match &app.field_error {
        Some((f, _)) if *f == field => format!("{} ✗", text),
        _ => text.to_string(),
    }
}

fn draw_request_line<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let editor = &app.console.editor;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(14),
        ])
        .split(area);

    let method_focused = focused(app, EditorField::Method);
    let method_block = Block::default()
        .title(if method_focused { " ▶ Method " } else { "   Method " })
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if method_focused {
            app.theme.focus
        } else {
            app.theme.muted
        }));
    let method = Paragraph::new(Line::from(vec![
        Span::styled(
            if method_focused { "◀ " } else { "  " },
            Style::default().fg(app.theme.muted),
        ),
        Span::styled(
            editor.method.as_str(),
            Style::default()
                .fg(app.theme.method_color(&editor.method))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if method_focused { " ▶" } else { "" },
            Style::default().fg(app.theme.muted),
        ),
    ]))
    .block(method_block);
    frame.render_widget(method, cols[0]);

    draw_input_field(
        frame,
        cols[1],
        &label(app, EditorField::Path, "Path"),
        &editor.path,
        "/api/users",
        focused(app, EditorField::Path),
    );
    draw_input_field(
        frame,
        cols[2],
        &label(app, EditorField::Status, "Status"),
        &editor.status,
        "200",
        focused(app, EditorField::Status),
    );
    draw_input_field(
        frame,
        cols[3],
        &label(app, EditorField::Delay, "Delay ms"),
        &editor.delay,
        "0",
        focused(app, EditorField::Delay),
    );
}

fn draw_content_type<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let body_mode = &app.console.editor.body_mode;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(area);

    let title = if body_mode.is_autofilled() {
        "Content type (auto)"
    } else {
        "Content type"
    };
    draw_input_field(
        frame,
        cols[0],
        title,
        body_mode.content_type(),
        "unset",
        focused(app, EditorField::ContentType),
    );

    let (mode, color) = if body_mode.is_json() {
        ("[x] JSON body", app.theme.success)
    } else {
        ("[ ] JSON body", app.theme.muted)
    };
    let toggle = Paragraph::new(Line::from(vec![
        Span::styled(mode, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("  ^J", Style::default().fg(app.theme.key_fg)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.muted)),
    );
    frame.render_widget(toggle, cols[1]);
}

fn draw_headers<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let headers = &app.console.editor.headers;
    let is_focused = focused(app, EditorField::Headers);
    let current = app.header_row();

    let block = Block::default()
        .title(if is_focused {
            format!(" ▶ Headers ({}) ", headers.len())
        } else {
            format!("   Headers ({}) ", headers.len())
        })
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if is_focused {
            app.theme.focus
        } else {
            app.theme.muted
        }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if headers.is_empty() {
        let empty = Paragraph::new("No headers").style(Style::default().fg(app.theme.muted));
        frame.render_widget(empty, inner);
        return;
    }

    let skip = (current + 1).saturating_sub(MAX_VISIBLE_HEADERS);
    let lines: Vec<Line> = headers
        .rows()
        .iter()
        .enumerate()
        .skip(skip)
        .take(MAX_VISIBLE_HEADERS)
        .map(|(i, row)| {
            let row_focused = is_focused && i == current;
            let cell = |text: &str, placeholder: &str, column: HeaderColumn, pad: usize| {
                let active = row_focused && app.header_column == column;
                let mut style = if text.is_empty() {
                    Style::default().fg(app.theme.muted)
                } else {
                    Style::default().fg(app.theme.fg)
                };
                if active {
                    style = style.add_modifier(Modifier::UNDERLINED).fg(app.theme.focus);
                }
                let shown = if text.is_empty() { placeholder } else { text };
                let cursor = if active { "█" } else { "" };
                Span::styled(format!("{:<pad$}", format!("{}{}", shown, cursor)), style)
            };

            Line::from(vec![
                Span::styled(
                    if row_focused { "▶ " } else { "  " },
                    Style::default().fg(app.theme.focus),
                ),
                cell(
                    &super::truncate(&row.name, NAME_WIDTH - 1),
                    "name",
                    HeaderColumn::Name,
                    NAME_WIDTH,
                ),
                Span::styled(" : ", Style::default().fg(app.theme.border)),
                cell(&row.value, "value", HeaderColumn::Value, 0),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_body<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let editor = &app.console.editor;
    let is_focused = focused(app, EditorField::Body);
    let mode = if editor.body_mode.is_json() { "JSON" } else { "raw" };

    let (title, color) = match editor.body_mode.body_error() {
        Some(error) => (format!(" Body ({}) ✗ {} ", mode, error), app.theme.error),
        None if is_focused => (format!(" ▶ Body ({}) ", mode), app.theme.focus),
        None => (format!("   Body ({}) ", mode), app.theme.muted),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    editor
        .body
        .render_with_block(area, frame.buffer_mut(), Some(block), is_focused);
}
