//! CAPTCHA verification collaborator.
//!
//! The terminal cannot render the visual hCaptcha challenge, so verification
//! goes through the browser: we bind a one-shot callback listener on
//! localhost, open the hosted challenge page with our site key and callback
//! port, and the page redirects the solved token back to us. The caller gets
//! an opaque token string; its meaning is entirely between the challenge
//! page and the backend.

use std::collections::HashMap;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use rand::Rng;
use thiserror::Error;
use tokio::sync::{Mutex, oneshot};
use tracing::debug;

/// How long we wait for the user to solve the challenge in the browser.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("captcha callback listener error: {0}")]
    Listener(#[from] std::io::Error),
    #[error("failed to open browser: {0}")]
    Browser(String),
    #[error("verification timed out")]
    Timeout,
    #[error("callback listener stopped before a token arrived")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct CaptchaWidget {
    site_key: String,
    challenge_url: String,
}

#[derive(Clone)]
struct CallbackState {
    expected_nonce: String,
    token_tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl CaptchaWidget {
    pub fn new(site_key: String, challenge_url: String) -> Self {
        Self {
            site_key,
            challenge_url,
        }
    }

    /// Run one verification round trip: listener up, browser opened, token
    /// awaited. Resolves with the opaque token on success.
    pub async fn verify(&self) -> Result<String, CaptchaError> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        // Nonce ties the callback to this verification attempt so a stray
        // request can't inject a token.
        let nonce: String = {
            let mut rng = rand::rng();
            (0..24)
                .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
                .collect()
        };

        let (token_tx, token_rx) = oneshot::channel();
        let state = CallbackState {
            expected_nonce: nonce.clone(),
            token_tx: Arc::new(Mutex::new(Some(token_tx))),
        };

        let app = Router::new()
            .route("/callback", get(receive_token))
            .with_state(state);

        let challenge = format!(
            "{}?sitekey={}&port={}&state={}",
            self.challenge_url, self.site_key, port, nonce
        );
        debug!(port, "opening captcha challenge in browser");
        open::that(&challenge).map_err(|e| CaptchaError::Browser(e.to_string()))?;

        let server = tokio::spawn(axum::serve(listener, app).into_future());
        let outcome = tokio::time::timeout(VERIFY_TIMEOUT, token_rx).await;
        // Grace period so the handler can finish writing the "verified" page
        // before the listener goes away.
        tokio::time::sleep(Duration::from_millis(250)).await;
        server.abort();

        match outcome {
            Err(_) => Err(CaptchaError::Timeout),
            Ok(Err(_)) => Err(CaptchaError::Closed),
            Ok(Ok(token)) => Ok(token),
        }
    }
}

/// `GET /callback?state=..&token=..` — the challenge page lands here once
/// solved. A plain GET keeps the cross-origin request simple (no preflight).
async fn receive_token(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<&'static str>) {
    let nonce = params.get("state").map(String::as_str).unwrap_or_default();
    if nonce != state.expected_nonce {
        return (StatusCode::FORBIDDEN, Html("Stale verification attempt."));
    }

    let Some(token) = params.get("token").filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, Html("Missing token."));
    };

    if let Some(tx) = state.token_tx.lock().await.take() {
        let _ = tx.send(token.clone());
    }

    (
        StatusCode::OK,
        Html("<h3>Verified. You can close this tab and return to the terminal.</h3>"),
    )
}
