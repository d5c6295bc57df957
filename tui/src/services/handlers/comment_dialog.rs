//! Comment dialog state transitions.
//!
//! The dialog's whole behavioral contract lives here: one fetch per open, a
//! hard 300-character draft bound, CAPTCHA-gated submission behind blocking
//! alerts, and an in-flight flag that disables edits while the POST is
//! outstanding. Every function is a plain state transition so the guards are
//! testable without a network; the loop spawns whatever the returned value
//! asks for.

use confess_api::ApiError;
use confess_shared::models::Confession;
use tracing::debug;

use super::SubmitRequest;
use crate::app::{Alert, AppState};
use crate::services::comment_dialog::MAX_COMMENT_CHARS;
use crate::services::scroll_lock::ScrollLock;

pub const EMPTY_COMMENT_ALERT: &str = "Comment cannot be empty";
pub const CAPTCHA_ALERT: &str = "Please complete the CAPTCHA";
pub const SUBMIT_SUCCESS_ALERT: &str = "Comment added successfully!";

/// Open the dialog for `id`: reset all dialog state, suspend feed scrolling,
/// and hand back the id for the single mount-time fetch.
pub fn open_comment_dialog(state: &mut AppState, id: String) -> String {
    // New instance: anything still in flight from an earlier open reports
    // under the old epoch and gets dropped.
    state.dialog_epoch = state.dialog_epoch.wrapping_add(1);
    state.show_comment_dialog = true;
    state.dialog_confession_id = Some(id.clone());
    state.confession_text = None;
    state.comments.clear();
    state.confession_loading = true;
    state.comment_scroll = 0;
    state.draft_comment.clear();
    state.captcha_token = None;
    state.captcha_pending = false;
    state.is_submitting = false;
    state.scroll_lock = Some(ScrollLock::acquire(state.scroll_flag()));
    debug!(confession_id = %id, "comment dialog opened");
    id
}

/// Close the dialog. Dropping the guard restores feed scrolling no matter
/// what was still in flight.
pub fn close_comment_dialog(state: &mut AppState) {
    state.show_comment_dialog = false;
    state.dialog_confession_id = None;
    state.confession_text = None;
    state.comments.clear();
    state.confession_loading = false;
    state.comment_scroll = 0;
    state.draft_comment.clear();
    state.captcha_token = None;
    state.captcha_pending = false;
    state.is_submitting = false;
    state.scroll_lock = None;
}

pub fn handle_confession_loaded(state: &mut AppState, id: &str, confession: Confession) {
    // A response for a dialog that is no longer the one on screen is stale.
    if !state.show_comment_dialog || state.dialog_confession_id.as_deref() != Some(id) {
        return;
    }
    state.confession_loading = false;
    state.confession_text = Some(confession.text);
    state.comments = confession.comments;
}

/// Fetch failure is silent: the spawn site already logged it, the dialog
/// just stays empty. No retry.
pub fn handle_confession_load_failed(state: &mut AppState, id: &str) {
    if !state.show_comment_dialog || state.dialog_confession_id.as_deref() != Some(id) {
        return;
    }
    state.confession_loading = false;
}

/// Append one typed character, only if the draft stays within the bound.
/// Characters past the cap are silently discarded.
pub fn handle_input_char(state: &mut AppState, c: char) {
    if !state.show_comment_dialog || state.is_submitting {
        return;
    }
    if state.draft_comment.chars().count() < MAX_COMMENT_CHARS {
        state.draft_comment.push(c);
    }
}

/// Pasted text obeys the same bound; whatever fits is kept.
pub fn handle_paste(state: &mut AppState, text: &str) {
    if !state.show_comment_dialog || state.is_submitting || state.alert.is_some() {
        return;
    }
    for c in text.chars().filter(|c| !c.is_control()) {
        if state.draft_comment.chars().count() >= MAX_COMMENT_CHARS {
            break;
        }
        state.draft_comment.push(c);
    }
}

pub fn handle_backspace(state: &mut AppState) {
    if !state.show_comment_dialog || state.is_submitting {
        return;
    }
    state.draft_comment.pop();
}

/// Kick off a browser verification round. `Some` carries the epoch the
/// round runs under; the caller spawns the verification with it.
pub fn start_captcha(state: &mut AppState) -> Option<u64> {
    if !state.show_comment_dialog || state.captcha_pending || state.is_submitting {
        return None;
    }
    state.captcha_pending = true;
    Some(state.dialog_epoch)
}

/// Token present is all "verified" means here; freshness is the CAPTCHA
/// service's problem. A token from a round a previous dialog instance
/// started is stale and dropped.
pub fn handle_captcha_verified(state: &mut AppState, epoch: u64, token: String) {
    if epoch != state.dialog_epoch || !state.show_comment_dialog {
        return;
    }
    state.captcha_pending = false;
    state.captcha_token = Some(token);
}

pub fn handle_captcha_failed(state: &mut AppState, epoch: u64) {
    if epoch != state.dialog_epoch {
        return;
    }
    state.captcha_pending = false;
}

pub fn scroll_comments_up(state: &mut AppState) {
    state.comment_scroll = state.comment_scroll.saturating_sub(1);
}

pub fn scroll_comments_down(state: &mut AppState) {
    if state.comment_scroll < state.comments.len().saturating_sub(1) {
        state.comment_scroll += 1;
    }
}

/// Guard-check a submission. `Some` means the guards passed, the in-flight
/// flag is set, and the caller must spawn the POST; `None` means either a
/// validation alert was raised or the control is disabled.
pub fn handle_submit(state: &mut AppState) -> Option<SubmitRequest> {
    if !state.show_comment_dialog || state.is_submitting {
        return None;
    }

    if state.draft_comment.trim().is_empty() {
        state.alert = Some(Alert::error(EMPTY_COMMENT_ALERT));
        return None;
    }

    let Some(captcha_token) = state.captcha_token.clone() else {
        state.alert = Some(Alert::error(CAPTCHA_ALERT));
        return None;
    };

    let confession_id = state.dialog_confession_id.clone()?;

    state.is_submitting = true;
    Some(SubmitRequest {
        confession_id,
        comment: state.draft_comment.clone(),
        captcha_token,
        epoch: state.dialog_epoch,
    })
}

/// Clears the in-flight flag and raises the outcome alert. An outcome from a
/// dialog instance that has since been closed (or closed and reopened) is
/// stale and dropped whole; the current instance never submitted, so its
/// in-flight flag is not touched either.
pub fn handle_submit_finished(state: &mut AppState, epoch: u64, result: Result<(), ApiError>) {
    if epoch != state.dialog_epoch || !state.show_comment_dialog {
        return;
    }
    state.is_submitting = false;

    match result {
        Ok(()) => {
            state.alert = Some(Alert::info(SUBMIT_SUCCESS_ALERT));
            state.draft_comment.clear();
            state.captcha_token = None;
        }
        Err(err) => {
            // TODO: hCaptcha tokens are single-use server-side, so keeping
            // the stale token here means the retry below gets rejected until
            // the user re-verifies. Clear it once the backend team confirms
            // the intended retry flow.
            state.alert = Some(Alert::error(format!(
                "Failed to post comment: {err}. Please try again."
            )));
        }
    }
}

pub fn dismiss_alert(state: &mut AppState) {
    state.alert = None;
}
