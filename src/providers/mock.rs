/*!
 * Mock provider implementation for testing.
 *
 * The mock replays scripted results in order and records every request it
 * receives. Once the script is exhausted it falls back to its behavior:
 * - `MockProvider::working()` - schema-conforming empty results
 * - `MockProvider::failing()` - always fails with a connection error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;

use crate::errors::ProviderError;
use crate::providers::{CompletionProvider, ResponseSchema};

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// System instruction
    pub system: String,
    /// User instruction
    pub user: String,
    /// Requested schema
    pub schema: ResponseSchema,
}

/// Behavior once the script runs out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Empty but valid results (no guidelines, no suggestions)
    Working,
    /// Always fails with a transport error
    Failing,
}

/// Mock provider for testing pipeline and patcher behavior
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    script: Mutex<VecDeque<Result<Value, ProviderError>>>,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that succeeds with empty results
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a working mock that first replays `script`
    pub fn scripted(script: Vec<Result<Value, ProviderError>>) -> Self {
        let mock = Self::working();
        mock.script.lock().extend(script);
        mock
    }

    /// Queue one more result
    pub fn push(&self, result: Result<Value, ProviderError>) {
        self.script.lock().push_back(result);
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Build a suggestions result from `(kind, original, proposed)` triples
    pub fn suggestions(items: &[(&str, &str, &str)]) -> Value {
        let suggestions: Vec<Value> = items
            .iter()
            .map(|(kind, original, proposed)| {
                json!({
                    "type": kind,
                    "location": "paragraph 1",
                    "original_text": original,
                    "proposed_text": proposed,
                    "reasoning": format!("{} fix", kind),
                })
            })
            .collect();
        json!({ "suggestions": suggestions })
    }

    /// Build a style result
    pub fn guidelines(text: &str) -> Value {
        json!({ "guidelines": text })
    }

    fn fallback(&self, schema: ResponseSchema) -> Result<Value, ProviderError> {
        match (self.behavior, schema) {
            (MockBehavior::Failing, _) => Err(ProviderError::ConnectionError(
                "mock provider is configured to fail".to_string(),
            )),
            (MockBehavior::Working, ResponseSchema::Suggestions) => Ok(json!({ "suggestions": [] })),
            (MockBehavior::Working, ResponseSchema::Style) => Ok(json!({ "guidelines": "" })),
            (MockBehavior::Working, ResponseSchema::Rewrite) => Err(ProviderError::ParseError(
                "mock provider has no scripted rewrite".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        schema: ResponseSchema,
    ) -> Result<Value, ProviderError> {
        self.requests.lock().push(MockRequest {
            system: system.to_string(),
            user: user.to_string(),
            schema,
        });

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => self.fallback(schema),
        }
    }
}
