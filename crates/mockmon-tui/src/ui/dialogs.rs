//! Modal dialogs

use crate::api::Backend;
use crate::app::App;
use crate::components::Popup;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draw a confirmation dialog sized to its message
pub fn draw_confirm(frame: &mut Frame, message: &str) {
    let lines: Vec<&str> = message.lines().collect();
    let max_line_len = lines.iter().map(|l| l.chars().count()).max().unwrap_or(30);
    let width = (max_line_len + 10).clamp(40, 70) as u16;
    let height = (lines.len() + 6).min(15) as u16;

    let full = frame.area();
    let area = super::centered_rect(
        (width * 100 / full.width.max(1)).min(80),
        (height * 100 / full.height.max(1)).min(50),
        full,
    );

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top padding
            Constraint::Min(2),    // Message
            Constraint::Length(1), // Spacing
            Constraint::Length(1), // Buttons
        ])
        .split(inner);

    let message_paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);
    frame.render_widget(message_paragraph, chunks[1]);

    let buttons = Line::from(vec![
        Span::styled(
            "[y/Enter]",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Yes   "),
        Span::styled(
            "[n/Esc]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" No"),
    ]);
    frame.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        chunks[3],
    );
}

/// Draw an error notification
pub fn draw_error(frame: &mut Frame, message: &str) {
    let content = format!("\n{}\n\nPress Esc to close", message);

    let popup = Popup::new(content)
        .title(" Error ")
        .style(Style::default().bg(Color::Black).fg(Color::Red))
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(popup, frame.area());
}

/// Draw a success notification
pub fn draw_success(frame: &mut Frame, message: &str) {
    let content = format!("\n{}\n\nPress any key to continue", message);

    let popup = Popup::new(content)
        .title(" Success ")
        .style(Style::default().bg(Color::Black).fg(Color::Green))
        .border_style(Style::default().fg(Color::Green));

    frame.render_widget(popup, frame.area());
}

/// Draw the proxy target dialog
pub fn draw_proxy_input<B: Backend>(frame: &mut Frame, app: &App<B>, value: &str) {
    let area = super::centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Proxy Settings ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.focus))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Spacing
            Constraint::Length(3), // Target URL
            Constraint::Length(1), // Note
            Constraint::Min(1),    // Help text
        ])
        .split(inner);

    draw_input_field(
        frame,
        chunks[1],
        "Target URL",
        value,
        "http://upstream:8080 (empty disables proxying)",
        true,
    );

    let note = Paragraph::new("Requests no mock matches are forwarded here and recorded.")
        .style(Style::default().fg(app.theme.muted))
        .alignment(Alignment::Center);
    frame.render_widget(note, chunks[2]);

    let help = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).bold()),
        Span::raw(" Save  "),
        Span::styled("[Ctrl+U]", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" Clear  "),
        Span::styled("[Esc]", Style::default().fg(Color::Red).bold()),
        Span::raw(" Cancel"),
    ]);
    frame.render_widget(
        Paragraph::new(help).alignment(Alignment::Center),
        chunks[3],
    );
}

/// Bordered single-line input with a block cursor when focused
pub fn draw_input_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    placeholder: &str,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if focused {
        format!(" ▶ {} ", label)
    } else {
        format!("   {} ", label)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = Span::styled(
        "█",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::SLOW_BLINK),
    );
    let text = if value.is_empty() {
        Span::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(value)
    };
    let line = if focused {
        Line::from(vec![text, cursor])
    } else {
        Line::from(text)
    };

    frame.render_widget(Paragraph::new(line), inner);
}
