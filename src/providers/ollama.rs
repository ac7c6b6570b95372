use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{
    error_from_response, error_from_transport, json_from_completion, CompletionProvider,
    ResponseSchema, RetryPolicy,
};

/// Ollama client for interacting with the Ollama chat API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Retry behaviour for transport and server errors
    retry: RetryPolicy,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// JSON Schema the reply must follow
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: false,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }

    /// Constrain the reply to a JSON Schema
    pub fn format(mut self, schema: Value) -> Self {
        self.format = Some(schema);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete base URL such as
    /// `http://localhost:11434`
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            // Ollama speaks HTTP/1.1
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            model: model.into(),
            temperature: 0.3,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| error_from_transport("Ollama", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        match serde_json::from_str::<ChatResponse>(&response_text) {
            Ok(chat_response) => Ok(chat_response),
            Err(e) => {
                error!(
                    "Failed to parse Ollama API chat response: {}. Raw response (first 500 chars): {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                );
                Self::join_streamed_lines(&response_text).ok_or_else(|| {
                    ProviderError::ParseError(format!("Failed to parse Ollama API chat response: {}", e))
                })
            }
        }
    }

    /// Some servers stream JSONL even when asked not to; stitch the message
    /// pieces back together
    fn join_streamed_lines(text: &str) -> Option<ChatResponse> {
        let mut content = String::new();
        let mut model = String::new();
        let mut seen = false;

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let value: Value = serde_json::from_str(line).ok()?;
            seen = true;
            if let Some(part) = value.pointer("/message/content").and_then(Value::as_str) {
                content.push_str(part);
            }
            if let Some(name) = value.get("model").and_then(Value::as_str) {
                model = name.to_string();
            }
        }

        seen.then(|| ChatResponse {
            model,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            done: true,
        })
    }
}

#[async_trait]
impl CompletionProvider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        schema: ResponseSchema,
    ) -> Result<Value, ProviderError> {
        let request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user.to_string() },
            ],
        )
        .temperature(self.temperature)
        .format(schema.json_schema());

        let response = self.retry.run("Ollama", || self.chat(&request)).await?;
        debug!("Ollama completion: {} chars", response.message.content.len());
        json_from_completion(&response.message.content)
    }
}
