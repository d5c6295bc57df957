//! Confession comment dialog.
//!
//! Full-viewport modal overlay showing a confession's text, its comments,
//! the CAPTCHA section and the comment input. Layout:
//!
//! ```text
//! ┌──────────────────── Comments ────────────────────┐
//! │                confession text                   │
//! │ ──────────────────────────────────────────────── │
//! │ → first comment                                  │
//! │ → second comment                                 │
//! │ ──────────────────────────────────────────────── │
//! │ □ CAPTCHA required — press Ctrl+T to verify      │
//! │ Write a comment...(max. 300 characters)          │
//! │ Enter send · Ctrl+T verify · ↑/↓ scroll · Esc    │
//! └──────────────────────────────────────────────────┘
//! ```

use crate::app::AppState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Draft length bound, mirrored by the input handler.
pub const MAX_COMMENT_CHARS: usize = 300;

pub fn render_comment_dialog(f: &mut Frame, state: &AppState) {
    if !state.show_comment_dialog {
        return;
    }

    let area = f.area();
    // Near-full-viewport overlay with a small margin, like the web modal.
    let popup_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    };

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(Span::styled(
            " Comments ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    f.render_widget(block, popup_area);

    let inner = popup_area.inner(Margin::new(1, 1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(confession_height(state, inner.width)),
            Constraint::Min(3),    // comments
            Constraint::Length(1), // captcha
            Constraint::Length(1), // input
            Constraint::Length(1), // help
        ])
        .split(inner);

    render_confession(f, state, chunks[0]);
    render_comments(f, state, chunks[1]);
    render_captcha_section(f, state, chunks[2]);
    render_input(f, state, chunks[3]);
    render_help(f, chunks[4]);
}

fn confession_height(state: &AppState, width: u16) -> u16 {
    let text = state.confession_text.as_deref().unwrap_or_default();
    let wrapped = textwrap::wrap(text, (width as usize).max(1)).len() as u16;
    // text + separator line below it
    wrapped.clamp(1, 6) + 1
}

fn render_confession(f: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = Vec::new();
    match (&state.confession_text, state.confession_loading) {
        (Some(text), _) => {
            for line in textwrap::wrap(text, (area.width as usize).max(1)) {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        (None, true) => lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))),
        // Fetch failed: show nothing, matching the silent-error contract.
        (None, false) => lines.push(Line::from("")),
    }
    lines.push(separator(area.width));
    f.render_widget(Paragraph::new(lines), area);
}

fn render_comments(f: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = comment_lines(state);
    if lines.is_empty() && !state.confession_loading {
        lines.push(Line::from(Span::styled(
            "No comments yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.comment_scroll as u16, 0));
    f.render_widget(paragraph, area);
}

/// One line per comment, arrow-prefixed like the board's web UI.
pub fn comment_lines(state: &AppState) -> Vec<Line<'static>> {
    state
        .comments
        .iter()
        .map(|comment| {
            Line::from(Span::styled(
                format!("→ {comment}"),
                Style::default().fg(Color::Gray),
            ))
        })
        .collect()
}

fn render_captcha_section(f: &mut Frame, state: &AppState, area: Rect) {
    let line = if state.captcha_token.is_some() {
        Line::from(Span::styled(
            "✓ CAPTCHA verified",
            Style::default().fg(Color::Green),
        ))
    } else if state.captcha_pending {
        Line::from(Span::styled(
            "… waiting for browser verification",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(Span::styled(
            "□ CAPTCHA required — press Ctrl+T to verify",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_input(f: &mut Frame, state: &AppState, area: Rect) {
    let line = if state.draft_comment.is_empty() {
        Line::from(Span::styled(
            "Write a comment...(max. 300 characters)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let style = if state.is_submitting {
            // Disabled while the POST is in flight.
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let count = state.draft_comment.chars().count();
        Line::from(vec![
            Span::styled(state.draft_comment.clone(), style),
            Span::styled("│", Style::default().fg(Color::Magenta)),
            Span::styled(
                format!(" {count}/{MAX_COMMENT_CHARS}"),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::DarkGray)),
        Span::styled(" send", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("Ctrl+T", Style::default().fg(Color::DarkGray)),
        Span::styled(" verify", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("↑/↓", Style::default().fg(Color::DarkGray)),
        Span::styled(" scroll", Style::default().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled("Esc", Style::default().fg(Color::DarkGray)),
        Span::styled(" close", Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(help), area);
}

fn separator(width: u16) -> Line<'static> {
    Line::from(Span::styled(
        "─".repeat(width as usize),
        Style::default().fg(Color::DarkGray),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_lines_are_arrow_prefixed() {
        let mut state = AppState::new();
        state.confession_text = Some("hello".to_string());
        state.comments = vec!["a".to_string(), "b".to_string()];

        let lines = comment_lines(&state);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "→ a");
        assert_eq!(lines[1].to_string(), "→ b");
    }

    #[test]
    fn comment_lines_empty_without_comments() {
        let state = AppState::new();
        assert!(comment_lines(&state).is_empty());
    }
}
