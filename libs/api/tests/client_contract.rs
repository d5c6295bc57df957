//! Contract tests for the confession API client against an in-process
//! HTTP server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use confess_api::{ApiClient, ApiError};
use serde_json::{Value, json};
use tokio::sync::Mutex;

type Captured = Arc<Mutex<Option<(Option<String>, Value)>>>;

/// Bind an ephemeral port, serve `app` in the background, and return the
/// base URL to point the client at.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn get_confession_decodes_text_and_comments() {
    let app = Router::new().route(
        "/confessions/42",
        get(|| async { Json(json!({"text": "hello", "comments": ["a", "b"]})) }),
    );
    let base = spawn_server(app).await;

    let confession = ApiClient::new(base).get_confession("42").await.unwrap();
    assert_eq!(confession.text, "hello");
    assert_eq!(confession.comments, vec!["a", "b"]);
}

#[tokio::test]
async fn get_confession_maps_not_found_to_status_error() {
    let app = Router::new().route(
        "/confessions/42",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "no such confession"}))) }),
    );
    let base = spawn_server(app).await;

    let err = ApiClient::new(base).get_confession("42").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "no such confession");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_confession_rejects_non_json_body() {
    let app = Router::new().route("/confessions/42", get(|| async { "<html>oops</html>" }));
    let base = spawn_server(app).await;

    let err = ApiClient::new(base).get_confession("42").await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[tokio::test]
async fn post_comment_sends_json_body_with_captcha_token() {
    let captured: Captured = Arc::new(Mutex::new(None));
    let sink = captured.clone();

    let app = Router::new()
        .route(
            "/confessions/42/comments",
            post(
                |State(sink): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    *sink.lock().await = Some((content_type, body));
                    (StatusCode::CREATED, Json(json!({"message": "created"})))
                },
            ),
        )
        .with_state(sink);
    let base = spawn_server(app).await;

    ApiClient::new(base)
        .post_comment("42", "nice!", "tok123")
        .await
        .unwrap();

    let (content_type, body) = captured.lock().await.take().unwrap();
    assert!(content_type.unwrap().starts_with("application/json"));
    assert_eq!(body["comment"], "nice!");
    assert_eq!(body["hCaptchaToken"], "tok123");
}

#[tokio::test]
async fn post_comment_surfaces_server_message_on_failure() {
    let app = Router::new().route(
        "/confessions/42/comments",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "server error"})),
            )
        }),
    );
    let base = spawn_server(app).await;

    let err = ApiClient::new(base)
        .post_comment("42", "nice!", "tok123")
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "server error");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn post_comment_falls_back_when_error_body_has_no_message() {
    let app = Router::new().route(
        "/confessions/42/comments",
        post(|| async { StatusCode::BAD_GATEWAY }),
    );
    let base = spawn_server(app).await;

    let err = ApiClient::new(base)
        .post_comment("42", "nice!", "tok123")
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert!(message.contains("502"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_confessions_decodes_feed() {
    let app = Router::new().route(
        "/confessions",
        get(|| async {
            Json(json!([
                {"id": "1", "text": "first"},
                {"id": "2", "text": "second"},
            ]))
        }),
    );
    let base = spawn_server(app).await;

    let feed = ApiClient::new(base).list_confessions().await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].id, "1");
    assert_eq!(feed[1].text, "second");
}
