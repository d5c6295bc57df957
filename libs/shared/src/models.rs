//! Wire types shared between the API client and the TUI.
//!
//! Field names follow the backend's JSON contract exactly; the only rename
//! is the camelCase `hCaptchaToken` the comment endpoint expects.

use serde::{Deserialize, Serialize};

/// A single confession as returned by `GET /confessions/{id}`.
///
/// Read-only from the client's perspective; the backend owns it. `comments`
/// is ordered oldest-first, plain strings with no author metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confession {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Feed listing entry from `GET /confessions`. The full comment list is only
/// fetched when the comment dialog opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfessionSummary {
    pub id: String,
    pub text: String,
}

/// POST body for `POST /confessions/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub comment: String,
    #[serde(rename = "hCaptchaToken")]
    pub h_captcha_token: String,
}

/// Error payload the backend attaches to non-2xx responses. `message` is
/// optional; callers fall back to a generic detail when it is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confession_decodes_backend_payload() {
        let payload = r#"{"text":"hello","comments":["a","b"]}"#;
        let confession: Confession = serde_json::from_str(payload).unwrap();
        assert_eq!(confession.text, "hello");
        assert_eq!(confession.comments, vec!["a", "b"]);
        assert!(confession.id.is_none());
    }

    #[test]
    fn confession_tolerates_missing_comments() {
        let confession: Confession = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert!(confession.comments.is_empty());
    }

    #[test]
    fn new_comment_serializes_camel_case_token_field() {
        let body = NewComment {
            comment: "nice!".to_string(),
            h_captcha_token: "tok123".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["comment"], "nice!");
        assert_eq!(json["hCaptchaToken"], "tok123");
    }

    #[test]
    fn error_body_message_is_optional() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());

        let body: ErrorBody = serde_json::from_str(r#"{"message":"server error"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("server error"));
    }
}
