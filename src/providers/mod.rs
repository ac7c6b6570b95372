/*!
 * Completion provider implementations.
 *
 * This module contains client implementations for the LLM services used by
 * the editorial pipeline:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also serves LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: scripted provider for tests
 *
 * Every provider answers the same question: given a system instruction, a
 * user instruction and the expected result schema, return a JSON value.
 * Shape validation happens in `editorial::schema`, not here.
 */

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{CompletionConfig, CompletionProviderKind};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use anthropic::Anthropic;
pub use mock::MockProvider;
pub use ollama::Ollama;
pub use openai::OpenAI;

/// Result shapes a stage can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// `{suggestions: [{type, location, original_text, proposed_text, reasoning}]}`
    Suggestions,
    /// `{guidelines: string}`
    Style,
    /// `{body: string}`
    Rewrite,
}

impl ResponseSchema {
    /// Schema name, as sent to APIs that want one
    pub fn name(&self) -> &'static str {
        match self {
            ResponseSchema::Suggestions => "suggestions",
            ResponseSchema::Style => "style_guidelines",
            ResponseSchema::Rewrite => "rewritten_body",
        }
    }

    /// JSON Schema of the expected result
    pub fn json_schema(&self) -> Value {
        match self {
            ResponseSchema::Suggestions => json!({
                "type": "object",
                "properties": {
                    "suggestions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "type": { "type": "string", "enum": ["typo", "structure", "coherence"] },
                                "location": { "type": "string" },
                                "original_text": { "type": "string" },
                                "proposed_text": { "type": "string" },
                                "reasoning": { "type": "string" }
                            },
                            "required": ["type", "location", "original_text", "proposed_text", "reasoning"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["suggestions"],
                "additionalProperties": false
            }),
            ResponseSchema::Style => json!({
                "type": "object",
                "properties": { "guidelines": { "type": "string" } },
                "required": ["guidelines"],
                "additionalProperties": false
            }),
            ResponseSchema::Rewrite => json!({
                "type": "object",
                "properties": { "body": { "type": "string" } },
                "required": ["body"],
                "additionalProperties": false
            }),
        }
    }

    /// Plain-language reminder appended to the system prompt for providers
    /// without native structured output
    pub fn instructions(&self) -> String {
        format!(
            "Respond with a single JSON object and nothing else. It must validate against this JSON Schema:\n{}",
            self.json_schema()
        )
    }
}

/// Common trait for all completion providers
///
/// Implementations are injected into the pipeline and the patcher; nothing
/// in the crate holds a global client.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Short provider name for logs and the audit trail
    fn name(&self) -> &str;

    /// Run one completion and return its JSON result
    ///
    /// # Arguments
    /// * `system` - System instruction
    /// * `user` - User instruction
    /// * `schema` - Expected result shape
    async fn complete(
        &self,
        system: &str,
        user: &str,
        schema: ResponseSchema,
    ) -> Result<Value, ProviderError>;
}

/// Retry settings shared by the HTTP providers
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff, doubled on each retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << shift))
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} request failed: {} - retry {}/{} in {}ms",
                        label,
                        e,
                        attempt,
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Turn a non-success HTTP response into the matching provider error
pub(crate) async fn error_from_response(label: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    debug!("{} API error ({}): {}", label, status, message);

    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

/// Map a reqwest transport failure
pub(crate) fn error_from_transport(label: &str, error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", label, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", label, error))
    }
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").unwrap()
});

/// Extract the JSON object from a free-text completion
///
/// Accepts a bare object, an object wrapped in a code fence, or an object
/// surrounded by prose.
pub fn json_from_completion(text: &str) -> Result<Value, ProviderError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(captures) = CODE_FENCE.captures(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&captures[1]) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    let preview: String = trimmed.chars().take(200).collect();
    Err(ProviderError::ParseError(format!(
        "completion does not contain a JSON object: {}",
        preview
    )))
}

/// Build the configured provider
pub fn build_provider(config: &CompletionConfig) -> anyhow::Result<Arc<dyn CompletionProvider>> {
    let retry = RetryPolicy {
        max_retries: config.common.retry_count,
        backoff_base_ms: config.common.retry_backoff_ms,
    };
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let temperature = config.common.temperature;

    let provider: Arc<dyn CompletionProvider> = match config.provider {
        CompletionProviderKind::OpenAI | CompletionProviderKind::LMStudio => Arc::new(
            OpenAI::new(config.get_api_key(), config.get_endpoint(), config.get_model(), timeout)?
                .with_temperature(temperature)
                .with_max_tokens(config.get_max_tokens())
                .with_retry(retry),
        ),
        CompletionProviderKind::Anthropic => Arc::new(
            Anthropic::new(config.get_api_key(), config.get_endpoint(), config.get_model(), timeout)?
                .with_temperature(temperature)
                .with_max_tokens(config.get_max_tokens())
                .with_retry(retry),
        ),
        CompletionProviderKind::Ollama => Arc::new(
            Ollama::new(config.get_endpoint(), config.get_model(), timeout)?
                .with_temperature(temperature)
                .with_retry(retry),
        ),
    };

    Ok(provider)
}
