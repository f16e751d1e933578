//! Integration tests for `ChatCompletionClient` against a local `wiremock`
//! server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postcraft_generator::{ChatCompletionClient, ChatSettings, CompletionError, CompletionService};

fn test_client(server: &MockServer) -> ChatCompletionClient {
    ChatCompletionClient::with_base_url(
        &format!("{}/openai/v1/", server.uri()),
        "test-key",
        ChatSettings::default(),
    )
    .expect("failed to build test ChatCompletionClient")
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn issues_one_request_per_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "max_tokens": 1500,
            "messages": [
                {"role": "system", "content": "You are a helpful assistant that strictly outputs JSON."},
                {"role": "user", "content": "write a post"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("  {\"post_text\": \"hi\"}\n")),
        )
        .expect(3)
        .mount(&server)
        .await;

    let out = test_client(&server)
        .complete("write a post", 3)
        .await
        .expect("completion should succeed");

    assert_eq!(out, vec![r#"{"post_text": "hi"}"#; 3]);
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server).complete("p", 3).await.unwrap_err();
    match err {
        CompletionError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("p", 1).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse), "got {err:?}");
}

#[tokio::test]
async fn zero_candidates_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let out = test_client(&server).complete("p", 0).await.unwrap();
    assert!(out.is_empty());
}
