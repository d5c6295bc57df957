//! Application state and the event loop.
//!
//! All state mutation happens on the event-loop task. Network work runs in
//! spawned tasks that report back through the single [`AppEvent`] channel, so
//! there is no shared mutable state to lock.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use confess_api::{ApiClient, ApiError, CaptchaWidget};
use confess_shared::models::{Confession, ConfessionSummary};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, EventStream, KeyEvent,
    KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::error;

use crate::services::handlers::{self, Effect, SubmitRequest};
use crate::services::scroll_lock::ScrollLock;
use crate::services::{alert, comment_dialog, feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Error,
}

/// Blocking user-facing alert. While one is set, every key except the
/// dismiss keys is swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the event loop reacts to: terminal input plus completions of
/// spawned network tasks.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Redraw,
    FeedLoaded(Vec<ConfessionSummary>),
    FeedLoadFailed,
    ConfessionLoaded { id: String, confession: Confession },
    ConfessionLoadFailed { id: String },
    CaptchaVerified { epoch: u64, token: String },
    CaptchaFailed { epoch: u64 },
    SubmitFinished { epoch: u64, result: Result<(), ApiError> },
}

pub struct AppOptions {
    pub client: ApiClient,
    pub captcha: CaptchaWidget,
    /// Open the comment dialog for this confession directly instead of
    /// starting on the feed. Closing the dialog then exits the app.
    pub confession_id: Option<String>,
}

pub struct AppState {
    // Feed (host view)
    pub feed: Vec<ConfessionSummary>,
    pub feed_selected: usize,
    pub feed_loading: bool,
    feed_scroll_suspended: Arc<AtomicBool>,

    // Comment dialog
    pub show_comment_dialog: bool,
    /// Bumped on every dialog open. Completions of tasks an earlier
    /// instance started carry the epoch they were spawned under and are
    /// dropped on mismatch, so a dialog closed mid-flight can never touch
    /// the instance on screen now.
    pub dialog_epoch: u64,
    pub dialog_confession_id: Option<String>,
    pub confession_text: Option<String>,
    pub comments: Vec<String>,
    pub confession_loading: bool,
    pub comment_scroll: usize,
    pub draft_comment: String,
    pub captcha_token: Option<String>,
    pub captcha_pending: bool,
    pub is_submitting: bool,
    /// Held exactly while the dialog is open; dropping it restores feed
    /// scrolling no matter how the dialog goes away.
    pub scroll_lock: Option<ScrollLock>,

    pub alert: Option<Alert>,
    pub exit_on_dialog_close: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            feed: Vec::new(),
            feed_selected: 0,
            feed_loading: false,
            feed_scroll_suspended: Arc::new(AtomicBool::new(false)),
            show_comment_dialog: false,
            dialog_epoch: 0,
            dialog_confession_id: None,
            confession_text: None,
            comments: Vec::new(),
            confession_loading: false,
            comment_scroll: 0,
            draft_comment: String::new(),
            captcha_token: None,
            captcha_pending: false,
            is_submitting: false,
            scroll_lock: None,
            alert: None,
            exit_on_dialog_close: false,
            should_quit: false,
        }
    }

    pub fn feed_scroll_suspended(&self) -> bool {
        self.feed_scroll_suspended.load(Ordering::Relaxed)
    }

    /// Flag handed to [`ScrollLock::acquire`] when the dialog opens.
    pub fn scroll_flag(&self) -> Arc<AtomicBool> {
        self.feed_scroll_suspended.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the TUI until the user quits. Owns the terminal for its lifetime.
pub async fn run(options: AppOptions) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, options).await;

    // Restore the terminal even when the loop errored.
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    options: AppOptions,
) -> Result<()> {
    let AppOptions {
        client,
        captcha,
        confession_id,
    } = options;

    let (tx, mut rx) = mpsc::channel::<AppEvent>(64);

    // Forward terminal input into the app event channel.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut events = EventStream::new();
            while let Some(Ok(event)) = events.next().await {
                let mapped = match event {
                    TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        Some(AppEvent::Key(key))
                    }
                    TermEvent::Paste(text) => Some(AppEvent::Paste(text)),
                    TermEvent::Resize(_, _) => Some(AppEvent::Redraw),
                    _ => None,
                };
                if let Some(mapped) = mapped
                    && tx.send(mapped).await.is_err()
                {
                    break;
                }
            }
        });
    }

    let mut state = AppState::new();
    match confession_id {
        Some(id) => {
            state.exit_on_dialog_close = true;
            let id = handlers::comment_dialog::open_comment_dialog(&mut state, id);
            spawn_fetch(&client, &tx, id);
        }
        None => {
            state.feed_loading = true;
            spawn_feed_load(&client, &tx);
        }
    }

    loop {
        terminal.draw(|f| draw(f, &state))?;

        let Some(event) = rx.recv().await else {
            break;
        };

        match handlers::handle_event(&mut state, event) {
            Effect::None => {}
            Effect::Quit => break,
            Effect::LoadFeed => spawn_feed_load(&client, &tx),
            Effect::FetchConfession(id) => spawn_fetch(&client, &tx, id),
            Effect::VerifyCaptcha(epoch) => spawn_captcha(&captcha, &tx, epoch),
            Effect::Submit(request) => spawn_submit(&client, &tx, request),
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, state: &AppState) {
    feed::render_feed(f, state);
    if state.show_comment_dialog {
        comment_dialog::render_comment_dialog(f, state);
    }
    if state.alert.is_some() {
        alert::render_alert(f, state);
    }
}

fn spawn_feed_load(client: &ApiClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        match client.list_confessions().await {
            Ok(feed) => {
                let _ = tx.send(AppEvent::FeedLoaded(feed)).await;
            }
            Err(err) => {
                error!(error = %err, "failed to load confession feed");
                let _ = tx.send(AppEvent::FeedLoadFailed).await;
            }
        }
    });
}

/// Mount-time fetch for the dialog. Failure is logged and otherwise silent:
/// the dialog just shows no text and no comments.
fn spawn_fetch(client: &ApiClient, tx: &mpsc::Sender<AppEvent>, id: String) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        match client.get_confession(&id).await {
            Ok(confession) => {
                let _ = tx.send(AppEvent::ConfessionLoaded { id, confession }).await;
            }
            Err(err) => {
                error!(confession_id = %id, error = %err, "failed to fetch confession");
                let _ = tx.send(AppEvent::ConfessionLoadFailed { id }).await;
            }
        }
    });
}

fn spawn_captcha(captcha: &CaptchaWidget, tx: &mpsc::Sender<AppEvent>, epoch: u64) {
    let captcha = captcha.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        match captcha.verify().await {
            Ok(token) => {
                let _ = tx.send(AppEvent::CaptchaVerified { epoch, token }).await;
            }
            Err(err) => {
                error!(error = %err, "captcha verification failed");
                let _ = tx.send(AppEvent::CaptchaFailed { epoch }).await;
            }
        }
    });
}

/// The submit task always reports back, success or failure, so the dialog
/// instance that started it is guaranteed to clear its in-flight flag.
fn spawn_submit(client: &ApiClient, tx: &mpsc::Sender<AppEvent>, request: SubmitRequest) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let epoch = request.epoch;
        let result = client
            .post_comment(&request.confession_id, &request.comment, &request.captcha_token)
            .await;
        let _ = tx.send(AppEvent::SubmitFinished { epoch, result }).await;
    });
}
