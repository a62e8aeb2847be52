use std::time::Duration;

use gpterm::core::config::ChatConfig;
use gpterm::transport::{ChatTransport, OpenAiTransport, TransportError, Turn};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const SYSTEM_PROMPT: &str = "Make sure all your responses are in Markdown format.";

// ============================================================================
// Helper Functions
// ============================================================================

fn config_for(server: &MockServer) -> ChatConfig {
    ChatConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "test-model".to_string(),
        api_key: "sk-test".to_string(),
        http_proxy: None,
        timeout: Duration::from_secs(5),
        system_prompt: SYSTEM_PROMPT.to_string(),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

// ============================================================================
// Success Path
// ============================================================================

#[tokio::test]
async fn test_successful_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello **there**")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = OpenAiTransport::new(&config_for(&mock_server)).unwrap();
    let reply = transport.ask(&[], "hi").await.unwrap();

    assert_eq!(reply, "Hello **there**");
}

#[tokio::test]
async fn test_request_carries_system_prompt_history_and_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": "one" },
                { "role": "assistant", "content": "first answer" },
                { "role": "user", "content": "two" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("second answer")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = OpenAiTransport::new(&config_for(&mock_server)).unwrap();
    let history = vec![Turn::user("one"), Turn::assistant("first answer")];
    let reply = transport.ask(&history, "two").await.unwrap();

    assert_eq!(reply, "second answer");
}

// ============================================================================
// Failure Paths
// ============================================================================

#[tokio::test]
async fn test_error_status_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":{"message":"Incorrect API key provided"}}"#),
        )
        .mount(&mock_server)
        .await;

    let transport = OpenAiTransport::new(&config_for(&mock_server)).unwrap();
    let err = transport.ask(&[], "hi").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    match err {
        TransportError::Status { body, .. } => {
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("Expected Status error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let transport = OpenAiTransport::new(&config_for(&mock_server)).unwrap();
    let err = transport.ask(&[], "hi").await.unwrap_err();

    assert!(matches!(err, TransportError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let transport = OpenAiTransport::new(&config_for(&mock_server)).unwrap();
    let err = transport.ask(&[], "hi").await.unwrap_err();

    assert!(matches!(err, TransportError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server);
    config.timeout = Duration::from_millis(300);
    let transport = OpenAiTransport::new(&config).unwrap();
    let err = transport.ask(&[], "hi").await.unwrap_err();

    assert_eq!(err, TransportError::Timeout(Duration::from_millis(300)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let config = ChatConfig {
        endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
        model: "test-model".to_string(),
        api_key: "sk-test".to_string(),
        http_proxy: None,
        timeout: Duration::from_secs(5),
        system_prompt: String::new(),
    };
    let transport = OpenAiTransport::new(&config).unwrap();
    let err = transport.ask(&[], "hi").await.unwrap_err();

    assert!(matches!(err, TransportError::Network(_)), "got {:?}", err);
}
