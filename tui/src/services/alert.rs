//! Blocking alert overlay.
//!
//! While an alert is set on the state, the key handler swallows everything
//! except the dismiss keys, which is as close to a blocking `alert()` as an
//! event-loop UI gets.

use crate::app::{AlertKind, AppState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_alert(f: &mut Frame, state: &AppState) {
    let Some(alert) = &state.alert else {
        return;
    };

    let (title, color) = match alert.kind {
        AlertKind::Info => (" Notice ", Color::Green),
        AlertKind::Error => (" Error ", Color::Red),
    };

    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let body = Paragraph::new(Line::from(alert.message.clone()))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(body, chunks[0]);

    let help = Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::DarkGray)),
        Span::styled(" dismiss", Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(help), chunks[1]);
}

/// Centered rect helper, percentage based.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
