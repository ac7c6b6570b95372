/*!
 * Integration tests for provider API interactions against mock servers
 */

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proofreader::errors::ProviderError;
use proofreader::providers::{Anthropic, CompletionProvider, Ollama, OpenAI, ResponseSchema, RetryPolicy};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        backoff_base_ms: 1,
    }
}

fn openai_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

/// Test OpenAI structured completion
#[tokio::test]
async fn test_openai_complete_withStructuredReply_shouldReturnJson() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "response_format": { "type": "json_schema", "json_schema": { "name": "suggestions" } }
        })))
        .respond_with(openai_reply(
            r#"{"suggestions":[{"type":"typo","location":"p1","original_text":"teh","proposed_text":"the","reasoning":"spelling"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("sk-test", server.uri(), "gpt-test", Duration::from_secs(5)).unwrap();
    let value = client
        .complete("system", "user", ResponseSchema::Suggestions)
        .await
        .unwrap();

    assert_eq!(value["suggestions"][0]["original_text"], "teh");
}

/// Test that server errors are retried until success
#[tokio::test]
async fn test_openai_complete_withTransientErrors_shouldRetry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(openai_reply(r#"{"guidelines":"Short sentences."}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("", server.uri(), "gpt-test", Duration::from_secs(5))
        .unwrap()
        .with_retry(fast_retry());
    let value = client.complete("s", "u", ResponseSchema::Style).await.unwrap();

    assert_eq!(value["guidelines"], "Short sentences.");
}

/// Test that client errors are not retried
#[tokio::test]
async fn test_openai_complete_withBadRequest_shouldFailWithoutRetry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad schema"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("k", server.uri(), "gpt-test", Duration::from_secs(5))
        .unwrap()
        .with_retry(fast_retry());
    let result = client.complete("s", "u", ResponseSchema::Style).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 400, .. })));
}

/// Test authentication failures
#[tokio::test]
async fn test_openai_complete_withRejectedKey_shouldBeAuthenticationError() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("wrong", server.uri(), "gpt-test", Duration::from_secs(5))
        .unwrap()
        .with_retry(fast_retry());

    assert!(matches!(
        client.complete("s", "u", ResponseSchema::Style).await,
        Err(ProviderError::AuthenticationError(_))
    ));
}

/// Test Anthropic completion wrapped in a code fence
#[tokio::test]
async fn test_anthropic_complete_withFencedJson_shouldExtractObject() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "Here you go:\n```json\n{\"body\": \"{\\\"root\\\":{}}\"}\n```" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Anthropic::new("ak-test", server.uri(), "claude-test", Duration::from_secs(5)).unwrap();
    let value = client.complete("s", "u", ResponseSchema::Rewrite).await.unwrap();

    assert_eq!(value["body"], "{\"root\":{}}");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(sent["system"].as_str().unwrap().contains("JSON Schema"));
}

/// Test Ollama chat with a schema-constrained format
#[tokio::test]
async fn test_ollama_complete_shouldSendSchemaAsFormat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama-test",
            "stream": false,
            "format": { "required": ["guidelines"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama-test",
            "message": { "role": "assistant", "content": "{\"guidelines\":\"Warm tone.\"}" },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Ollama::new(server.uri(), "llama-test", Duration::from_secs(5)).unwrap();
    let value = client.complete("s", "u", ResponseSchema::Style).await.unwrap();

    assert_eq!(value["guidelines"], "Warm tone.");
}

/// Test that an unparseable completion is not retried
#[tokio::test]
async fn test_ollama_complete_withProse_shouldBeParseError() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama-test",
            "message": { "role": "assistant", "content": "I cannot help with that." },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Ollama::new(server.uri(), "llama-test", Duration::from_secs(5))
        .unwrap()
        .with_retry(fast_retry());

    assert!(matches!(
        client.complete("s", "u", ResponseSchema::Style).await,
        Err(ProviderError::ParseError(_))
    ));
}
