//! `MockCompletionClient` — a test double for `CompletionClient`.
//!
//! Used by node and engine tests (and by the CLI's `--mock-ai` flag) so
//! assistant nodes can run without a provider key.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{AiError, CompletionClient};
use crate::role::AssistantRole;

/// Behaviour injected into `MockCompletionClient` at construction time.
pub enum MockBehaviour {
    /// Return a fixed reply for every call.
    Reply(String),
    /// Return the prompt itself, so tests can assert on resolved templates.
    EchoPrompt,
    /// Fail every call with a provider-style error message.
    Fail(String),
}

/// A mock client that records every call it receives.
pub struct MockCompletionClient {
    behaviour: MockBehaviour,
    calls: Arc<Mutex<Vec<(String, AssistantRole)>>>,
}

impl MockCompletionClient {
    /// Create a mock that always replies with the given text.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::Reply(reply.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that echoes the prompt back as the completion.
    pub fn echoing() -> Self {
        Self {
            behaviour: MockBehaviour::EchoPrompt,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with the given provider message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::Fail(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All `(prompt, role)` pairs seen so far, in call order.
    pub fn calls(&self) -> Vec<(String, AssistantRole)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `complete` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str, role: AssistantRole) -> Result<String, AiError> {
        self.calls.lock().unwrap().push((prompt.to_string(), role));

        match &self.behaviour {
            MockBehaviour::Reply(reply) => Ok(reply.clone()),
            MockBehaviour::EchoPrompt => Ok(prompt.to_string()),
            MockBehaviour::Fail(message) => Err(AiError::Api {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replying_mock_returns_canned_text_and_records_calls() {
        let mock = MockCompletionClient::replying("canned");
        let out = mock.complete("p1", AssistantRole::General).await.unwrap();
        assert_eq!(out, "canned");
        assert_eq!(mock.calls(), vec![("p1".to_string(), AssistantRole::General)]);
    }

    #[tokio::test]
    async fn echoing_mock_returns_prompt() {
        let mock = MockCompletionClient::echoing();
        let out = mock.complete("say this", AssistantRole::Custom).await.unwrap();
        assert_eq!(out, "say this");
    }

    #[tokio::test]
    async fn failing_mock_surfaces_provider_message() {
        let mock = MockCompletionClient::failing("quota exceeded");
        let err = mock.complete("p", AssistantRole::General).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(mock.call_count(), 1);
    }
}
