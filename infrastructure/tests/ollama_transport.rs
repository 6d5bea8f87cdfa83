//! Integration tests for the Ollama transport using wiremock.

use riskwatch_application::{
    AiSettings, ChatTransport, StreamChatError, StreamChatInput, StreamChatUseCase,
    TransportError,
};
use riskwatch_domain::{ConversationHistory, Model};
use riskwatch_infrastructure::OllamaTransport;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXAMPLE_BODY: &str = concat!(
    "{\"model\":\"gemma3:12b\",\"message\":{\"role\":\"assistant\",\"content\":\"Risk \"},\"done\":false}\n",
    "{\"model\":\"gemma3:12b\",\"message\":{\"role\":\"assistant\",\"content\":\"is moderate.\"},\"done\":false}\n",
    "{\"model\":\"gemma3:12b\",\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\"}\n",
);

fn history() -> ConversationHistory {
    ConversationHistory::system_and_user("You are a helpful DeFi assistant.", "Risk?")
}

/// Address of a port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn use_case() -> StreamChatUseCase {
    StreamChatUseCase::new(Arc::new(OllamaTransport::new()))
}

#[tokio::test]
async fn stream_chat_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "model": "gemma3:12b",
            "messages": [
                {"role": "system", "content": "You are a helpful DeFi assistant."},
                {"role": "user", "content": "Risk?"}
            ],
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-ndjson")
                .set_body_string(EXAMPLE_BODY),
        )
        .expect(1)
        .mount(&server)
        .await;

    let input = StreamChatInput::new(server.uri(), Model::default(), history());
    let mut tokens = Vec::new();
    let completion = use_case()
        .execute_with_stats(input, |t| tokens.push(t.to_string()), None)
        .await
        .expect("stream should complete");

    assert_eq!(completion.text, "Risk is moderate.");
    assert_eq!(tokens, vec!["Risk ", "is moderate.", ""]);
    assert_eq!(completion.stats.done_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("{\"error\":\"model 'nope' not found\"}"),
        )
        .mount(&server)
        .await;

    let input = StreamChatInput::new(server.uri(), Model::new("nope").unwrap(), history());
    let mut calls = 0;
    let err = use_case()
        .execute(input, |_| calls += 1, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StreamChatError::Transport(TransportError::Status {
            status: 404,
            body: "{\"error\":\"model 'nope' not found\"}".to_string()
        })
    );
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn connection_refused_fails_without_callbacks() {
    let settings = AiSettings::default().with_server_url(closed_port_url());
    let input = StreamChatInput::from_settings(&settings, history()).unwrap();
    let mut calls = 0;
    let err = use_case()
        .execute(input, |_| calls += 1, None)
        .await
        .unwrap_err();

    assert!(err.is_transport(), "expected transport error, got {err:?}");
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn list_models_reads_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "gemma3:12b", "size": 8149190253_u64, "modified_at": "2025-03-12T10:00:00Z"},
                {"name": "llama3.2"}
            ]
        })))
        .mount(&server)
        .await;

    let models = OllamaTransport::new()
        .list_models(&server.uri())
        .await
        .unwrap();
    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["gemma3:12b", "llama3.2"]);
    assert_eq!(models[0].size, Some(8149190253));
}

#[tokio::test]
async fn list_models_rejects_garbage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = OllamaTransport::new()
        .list_models(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::InvalidResponse(_)));
}

#[tokio::test]
async fn check_connection_reflects_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let transport = OllamaTransport::new();
    assert!(transport.check_connection(&server.uri()).await);

    assert!(!transport.check_connection(&closed_port_url()).await);
}
