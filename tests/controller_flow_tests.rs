use std::time::Duration;

use gpterm::core::action::{Action, Effect};
use gpterm::core::config::ChatConfig;
use gpterm::transport::{ChatTransport, OpenAiTransport, Turn};
use gpterm::tui::conversation::Author;
use gpterm::tui::event::TuiEvent;
use gpterm::tui::indicator::FRAMES;
use gpterm::tui::{Controller, Phase};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn type_and_submit(controller: &mut Controller, text: &str) -> Effect {
    for c in text.chars() {
        controller.handle_event(TuiEvent::InputChar(c));
    }
    controller.handle_event(TuiEvent::Submit)
}

async fn mock_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(server)
        .await;
}

fn transport_for(server: &MockServer) -> OpenAiTransport {
    OpenAiTransport::new(&ChatConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "test-model".to_string(),
        api_key: "sk-test".to_string(),
        http_proxy: None,
        timeout: Duration::from_secs(5),
        system_prompt: String::new(),
    })
    .unwrap()
}

/// Run the dispatch effect the way the event loop would, feeding the outcome back.
async fn carry_out(controller: &mut Controller, transport: &dyn ChatTransport, effect: Effect) {
    let Effect::Dispatch { history, prompt } = effect else {
        panic!("Expected Dispatch, got: {:?}", effect);
    };
    let action = match transport.ask(&history, &prompt).await {
        Ok(reply) => Action::ReplyReceived(reply),
        Err(err) => Action::TransportFailed(err),
    };
    controller.update(action);
}

// ============================================================================
// Flows
// ============================================================================

#[tokio::test]
async fn test_hi_tick_hello_flow() {
    let mock_server = MockServer::start().await;
    mock_reply(&mock_server, "hello").await;
    let transport = transport_for(&mock_server);

    let mut controller = Controller::new("test-model");
    let effect = type_and_submit(&mut controller, "hi");

    let blocks = controller.conversation().blocks();
    assert_eq!(blocks[blocks.len() - 2].source, "hi");
    assert_eq!(blocks[blocks.len() - 1].source, FRAMES[0]);
    assert!(!controller.is_input_focused());

    controller.update(Action::Tick);
    let last = controller.conversation().last().unwrap();
    assert_eq!(last.source, FRAMES[1]);

    carry_out(&mut controller, &transport, effect).await;

    let last = controller.conversation().last().unwrap();
    assert_eq!(last.author, Author::Bot);
    assert_eq!(last.source, "hello");
    assert!(!controller.conversation().has_placeholder());
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.is_input_focused());
    assert_eq!(
        controller.transcript(),
        &[Turn::user("hi"), Turn::assistant("hello")]
    );
}

#[tokio::test]
async fn test_failed_request_terminates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;
    let transport = transport_for(&mock_server);

    let mut controller = Controller::new("test-model");
    let Effect::Dispatch { history, prompt } = type_and_submit(&mut controller, "hi") else {
        panic!("Expected Dispatch");
    };
    let err = transport.ask(&history, &prompt).await.unwrap_err();

    let effect = controller.update(Action::TransportFailed(err));
    match effect {
        Effect::Fail(err) => {
            assert_eq!(err.status(), Some(500));
            assert!(err.to_string().contains("upstream exploded"));
        }
        other => panic!("Expected Fail, got: {:?}", other),
    }
    assert_eq!(controller.phase(), Phase::Terminated);
}

#[tokio::test]
async fn test_resize_mid_request_then_reply() {
    let mock_server = MockServer::start().await;
    mock_reply(&mock_server, "a reply long enough to wrap across several rows when narrow").await;
    let transport = transport_for(&mock_server);

    let mut controller = Controller::new("test-model");
    let effect = type_and_submit(&mut controller, "hi");
    controller.update(Action::Resize {
        width: 20,
        height: 12,
    });
    let count = controller.conversation().len();

    carry_out(&mut controller, &transport, effect).await;

    assert_eq!(controller.conversation().len(), count);
    let last = controller.conversation().last().unwrap();
    assert!(last.height() > 2, "reply should wrap at the narrow width");
}
