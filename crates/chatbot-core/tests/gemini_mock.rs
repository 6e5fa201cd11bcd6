use std::time::Duration;

use chatbot_core::{ApiFailure, GeminiClient, RequestPipeline, RetryPolicy, SAFETY_GUIDANCE};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT_PATH: &str = "/models/gemini-test:generateContent";

fn pipeline(server: &MockServer) -> RequestPipeline<GeminiClient> {
    let client = GeminiClient::new(&server.uri(), MODEL, "test-api-key");
    RequestPipeline::new(client).with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
}

fn text_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    }))
}

fn overloaded() -> ResponseTemplate {
    ResponseTemplate::new(503).set_body_json(json!({
        "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
    }))
}

#[tokio::test]
async fn test_posts_payload_with_key_in_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("key", "test-api-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "What is Rust?" }] }],
            "generationConfig": { "topK": 40, "maxOutputTokens": 1024 }
        })))
        .respond_with(text_reply("A systems language."))
        .expect(1)
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("What is Rust?").await;
    assert_eq!(reply, Ok("A systems language.".to_string()));
}

#[tokio::test]
async fn test_recovers_after_transient_overload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(overloaded())
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(text_reply("Back online."))
        .expect(1)
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("hello").await;
    assert_eq!(reply, Ok("Back online.".to_string()));
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(overloaded())
        .expect(3)
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("hello").await;
    assert_eq!(reply, Err(ApiFailure::RetriesExhausted { attempts: 3 }));
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("hello").await;
    assert_eq!(
        reply,
        Err(ApiFailure::HttpStatus {
            status: 429,
            message: "Resource has been exhausted".to_string()
        })
    );
}

#[tokio::test]
async fn test_error_body_without_json_uses_fallback_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("hello").await;
    assert_eq!(
        reply,
        Err(ApiFailure::HttpStatus {
            status: 404,
            message: "Unknown error".to_string()
        })
    );
}

#[tokio::test]
async fn test_safety_finish_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY", "index": 0 }]
        })))
        .mount(&server)
        .await;

    let reply = pipeline(&server).send("hello").await;
    assert_eq!(reply, Ok(SAFETY_GUIDANCE.to_string()));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_failure() {
    // Nothing listens on port 1.
    let client = GeminiClient::new("http://127.0.0.1:1", MODEL, "test-api-key");
    let reply = RequestPipeline::new(client).send("hello").await;

    match reply {
        Err(ApiFailure::Network(message)) => assert!(!message.contains("test-api-key")),
        other => panic!("expected a network failure, got {other:?}"),
    }
}
