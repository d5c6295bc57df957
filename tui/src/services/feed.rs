//! Confession feed — the host view the comment dialog overlays.

use crate::app::AppState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render_feed(f: &mut Frame, state: &AppState) {
    let area = f.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Confessions ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let mut lines = Vec::new();
    if state.feed_loading {
        lines.push(Line::from(Span::styled(
            "Loading confessions...",
            Style::default().fg(Color::Yellow),
        )));
    } else if state.feed.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing here yet.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let visible = chunks[0].height as usize;
        let top = state.feed_selected.saturating_sub(visible.saturating_sub(1));
        for (i, entry) in state.feed.iter().enumerate().skip(top).take(visible) {
            let selected = i == state.feed_selected;
            let prefix = if selected { "› " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let text = truncate_chars(&entry.text, (chunks[0].width as usize).saturating_sub(2));
            lines.push(Line::from(Span::styled(format!("{prefix}{text}"), style)));
        }
    }
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let help = Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::DarkGray)),
        Span::styled(" browse", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("Enter", Style::default().fg(Color::DarkGray)),
        Span::styled(" comments", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("r", Style::default().fg(Color::DarkGray)),
        Span::styled(" reload", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("q", Style::default().fg(Color::DarkGray)),
        Span::styled(" quit", Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(help), chunks[1]);
}

/// Char-safe truncation for feed rows (UTF-8 aware, no byte slicing).
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max && max > 3 {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("short", 40), "short");
        assert_eq!(truncate_chars("abcdefgh", 7), "abcd...");
        // Multi-byte chars must not be split mid-codepoint.
        assert_eq!(truncate_chars("éééééééé", 7), "éééé...");
    }
}
