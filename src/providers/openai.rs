use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{
    error_from_response, error_from_transport, json_from_completion, CompletionProvider,
    ResponseSchema, RetryPolicy,
};

/// OpenAI client for the chat completions API
///
/// Also used for OpenAI-compatible local servers such as LM Studio.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Completion token limit
    max_tokens: u32,
    /// Retry behaviour for transport and server errors
    retry: RetryPolicy,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: Value,
}

/// A chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Message text
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices
    pub choices: Vec<ChatChoice>,
}

/// A single choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChatMessage,
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 4096,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn request_for(&self, system: &str, user: &str, schema: ResponseSchema) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: Some(system.to_string()) },
                ChatMessage { role: "user".to_string(), content: Some(user.to_string()) },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name(),
                    "strict": true,
                    "schema": schema.json_schema(),
                }
            }),
        }
    }

    async fn send_once(&self, request: &ChatCompletionRequest) -> Result<Value, ProviderError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let mut builder = self.client.post(&url).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| error_from_transport("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::ParseError("response has no message content".to_string()))?;

        debug!("OpenAI completion: {} chars", content.len());
        json_from_completion(&content)
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        schema: ResponseSchema,
    ) -> Result<Value, ProviderError> {
        let request = self.request_for(system, user, schema);
        self.retry.run("OpenAI", || self.send_once(&request)).await
    }
}
