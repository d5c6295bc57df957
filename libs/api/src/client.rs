//! HTTP client for the confession backend.
//!
//! Thin wrapper over `reqwest`: one method per endpoint, non-2xx responses
//! mapped to [`ApiError::Status`] carrying the body's `message` detail when
//! the backend provides one. No retries anywhere; callers decide how a
//! failure surfaces.

use confess_shared::models::{Confession, ConfessionSummary, ErrorBody, NewComment};
use thiserror::Error;

pub use reqwest::StatusCode;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` must already be normalized (no trailing slash) — see
    /// `confess_shared::config`.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /confessions` — feed listing for the host view.
    pub async fn list_confessions(&self) -> Result<Vec<ConfessionSummary>, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/confessions"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// `GET /confessions/{id}` — confession text plus its comment list.
    pub async fn get_confession(&self, id: &str) -> Result<Confession, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/confessions/{id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// `POST /confessions/{id}/comments` — submit a CAPTCHA-verified comment.
    pub async fn post_comment(
        &self,
        id: &str,
        comment: &str,
        captcha_token: &str,
    ) -> Result<(), ApiError> {
        let body = NewComment {
            comment: comment.to_string(),
            h_captcha_token: captcha_token.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint(&format!("/confessions/{id}/comments")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(())
    }
}

/// Build an [`ApiError::Status`] from a non-2xx response, preferring the
/// backend's `message` field over a generic detail. The body may be empty or
/// non-JSON; both decode to the fallback.
async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    ApiError::Status {
        status,
        message: body
            .message
            .unwrap_or_else(|| format!("request failed with status {status}")),
    }
}
