//! Event dispatch: terminal keys and task completions into state transitions.
//!
//! Handlers mutate [`AppState`] and return an [`Effect`] describing the
//! network work the loop should spawn. Keeping the decision separate from
//! the spawn keeps every guard testable without a network.

pub mod comment_dialog;

use crate::app::{AppEvent, AppState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A submit the guards have already approved; carries everything the POST
/// needs so the spawned task never touches state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub confession_id: String,
    pub comment: String,
    pub captcha_token: String,
    /// Dialog epoch the submit was approved under; its outcome is dropped
    /// if a different dialog instance is on screen by the time it lands.
    pub epoch: u64,
}

#[derive(Debug)]
pub enum Effect {
    None,
    Quit,
    LoadFeed,
    FetchConfession(String),
    VerifyCaptcha(u64),
    Submit(SubmitRequest),
}

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Effect {
    match event {
        AppEvent::Key(key) => handle_key(state, key),
        AppEvent::Paste(text) => {
            comment_dialog::handle_paste(state, &text);
            Effect::None
        }
        AppEvent::Redraw => Effect::None,
        AppEvent::FeedLoaded(feed) => {
            state.feed_loading = false;
            state.feed = feed;
            state.feed_selected = state.feed_selected.min(state.feed.len().saturating_sub(1));
            Effect::None
        }
        AppEvent::FeedLoadFailed => {
            state.feed_loading = false;
            Effect::None
        }
        AppEvent::ConfessionLoaded { id, confession } => {
            comment_dialog::handle_confession_loaded(state, &id, confession);
            Effect::None
        }
        AppEvent::ConfessionLoadFailed { id } => {
            comment_dialog::handle_confession_load_failed(state, &id);
            Effect::None
        }
        AppEvent::CaptchaVerified { epoch, token } => {
            comment_dialog::handle_captcha_verified(state, epoch, token);
            Effect::None
        }
        AppEvent::CaptchaFailed { epoch } => {
            comment_dialog::handle_captcha_failed(state, epoch);
            Effect::None
        }
        AppEvent::SubmitFinished { epoch, result } => {
            comment_dialog::handle_submit_finished(state, epoch, result);
            Effect::None
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Effect {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Effect::Quit;
    }

    // Blocking alert: swallow everything except dismissal.
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            comment_dialog::dismiss_alert(state);
        }
        return Effect::None;
    }

    if state.show_comment_dialog {
        handle_dialog_key(state, key)
    } else {
        handle_feed_key(state, key)
    }
}

fn handle_dialog_key(state: &mut AppState, key: KeyEvent) -> Effect {
    match key.code {
        KeyCode::Esc => {
            comment_dialog::close_comment_dialog(state);
            if state.exit_on_dialog_close {
                state.should_quit = true;
            }
            Effect::None
        }
        KeyCode::Enter => match comment_dialog::handle_submit(state) {
            Some(request) => Effect::Submit(request),
            None => Effect::None,
        },
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match comment_dialog::start_captcha(state) {
                Some(epoch) => Effect::VerifyCaptcha(epoch),
                None => Effect::None,
            }
        }
        KeyCode::Up => {
            comment_dialog::scroll_comments_up(state);
            Effect::None
        }
        KeyCode::Down => {
            comment_dialog::scroll_comments_down(state);
            Effect::None
        }
        KeyCode::Backspace => {
            comment_dialog::handle_backspace(state);
            Effect::None
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            comment_dialog::handle_input_char(state, c);
            Effect::None
        }
        _ => Effect::None,
    }
}

fn handle_feed_key(state: &mut AppState, key: KeyEvent) -> Effect {
    match key.code {
        KeyCode::Char('q') => Effect::Quit,
        KeyCode::Char('r') => {
            state.feed_loading = true;
            Effect::LoadFeed
        }
        KeyCode::Up | KeyCode::Char('k') => {
            feed_scroll_up(state);
            Effect::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            feed_scroll_down(state);
            Effect::None
        }
        KeyCode::Enter => {
            let selected = state.feed.get(state.feed_selected).map(|e| e.id.clone());
            match selected {
                Some(id) => {
                    let id = comment_dialog::open_comment_dialog(state, id);
                    Effect::FetchConfession(id)
                }
                None => Effect::None,
            }
        }
        _ => Effect::None,
    }
}

/// Feed scrolling honors the dialog's scroll lock: no movement while the
/// modal holds it.
pub fn feed_scroll_up(state: &mut AppState) {
    if state.feed_scroll_suspended() {
        return;
    }
    state.feed_selected = state.feed_selected.saturating_sub(1);
}

pub fn feed_scroll_down(state: &mut AppState) {
    if state.feed_scroll_suspended() {
        return;
    }
    let max = state.feed.len().saturating_sub(1);
    if state.feed_selected < max {
        state.feed_selected += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confess_shared::models::ConfessionSummary;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn state_with_feed() -> AppState {
        let mut state = AppState::new();
        state.feed = vec![
            ConfessionSummary {
                id: "1".to_string(),
                text: "first".to_string(),
            },
            ConfessionSummary {
                id: "2".to_string(),
                text: "second".to_string(),
            },
        ];
        state
    }

    #[test]
    fn enter_on_feed_opens_dialog_for_selected_confession() {
        let mut state = state_with_feed();
        state.feed_selected = 1;

        let effect = handle_event(&mut state, key(KeyCode::Enter));
        assert!(matches!(effect, Effect::FetchConfession(id) if id == "2"));
        assert!(state.show_comment_dialog);
        assert!(state.feed_scroll_suspended());
    }

    #[test]
    fn feed_scrolling_is_suspended_while_dialog_open() {
        let mut state = state_with_feed();
        handle_event(&mut state, key(KeyCode::Enter));
        assert_eq!(state.feed_selected, 0);

        feed_scroll_down(&mut state);
        assert_eq!(state.feed_selected, 0);

        comment_dialog::close_comment_dialog(&mut state);
        feed_scroll_down(&mut state);
        assert_eq!(state.feed_selected, 1);
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let mut state = state_with_feed();
        state.alert = Some(crate::app::Alert::error("boom"));

        // Swallowed: no quit, no scroll.
        assert!(matches!(
            handle_event(&mut state, key(KeyCode::Char('q'))),
            Effect::None
        ));
        assert!(matches!(
            handle_event(&mut state, key(KeyCode::Down)),
            Effect::None
        ));
        assert_eq!(state.feed_selected, 0);
        assert!(state.alert.is_some());

        handle_event(&mut state, key(KeyCode::Enter));
        assert!(state.alert.is_none());
    }

    #[test]
    fn ctrl_c_quits_even_under_an_alert() {
        let mut state = state_with_feed();
        state.alert = Some(crate::app::Alert::info("done"));

        let event = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(handle_event(&mut state, event), Effect::Quit));
    }

    #[test]
    fn esc_closes_dialog_and_quits_when_directly_opened() {
        let mut state = AppState::new();
        state.exit_on_dialog_close = true;
        comment_dialog::open_comment_dialog(&mut state, "42".to_string());

        handle_event(&mut state, key(KeyCode::Esc));
        assert!(!state.show_comment_dialog);
        assert!(state.should_quit);
    }

    #[test]
    fn feed_selection_clamped_after_reload() {
        let mut state = state_with_feed();
        state.feed_selected = 1;

        handle_event(
            &mut state,
            AppEvent::FeedLoaded(vec![ConfessionSummary {
                id: "1".to_string(),
                text: "only one left".to_string(),
            }]),
        );
        assert_eq!(state.feed_selected, 0);
    }
}
