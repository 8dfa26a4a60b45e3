//! OpenAI-compatible completion client.
//!
//! Works against any `/chat/completions` endpoint that speaks the OpenAI
//! wire format (OpenAI, Ollama, vLLM, Groq, OpenRouter, …).  Requests are
//! non-streaming: the engine consumes exactly one completion string per
//! node, so there is nothing to stream into.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{AiError, CompletionClient};
use crate::role::AssistantRole;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Bearer token; empty string sends no Authorization header (local
    /// endpoints such as Ollama accept that).
    pub api_key: String,
    /// Model identifier passed through to the provider.
    pub model: String,
    /// Full URL of the chat-completions endpoint.
    pub base_url: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl AiConfig {
    /// Build a config from `FLOWMILL_AI_API_KEY`, `FLOWMILL_AI_MODEL` and
    /// `FLOWMILL_AI_BASE_URL`, falling back to the defaults above.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("FLOWMILL_AI_API_KEY").unwrap_or(defaults.api_key),
            model: std::env::var("FLOWMILL_AI_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("FLOWMILL_AI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }
}

/// `CompletionClient` backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiClient {
    http: Client,
    config: AiConfig,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

// Request types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// Response types

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str, role: AssistantRole) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: role.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
        };

        debug!(model = %self.config.model, role = %role, "sending completion request");

        let mut builder = self.http.post(&self.config.base_url).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(AiError::MissingContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_target_openai() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn response_with_content_deserialises() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
    }

    #[test]
    fn response_without_choices_deserialises_to_empty() {
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }
}
