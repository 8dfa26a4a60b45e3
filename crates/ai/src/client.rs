//! The `CompletionClient` trait — the contract every completion backend
//! must fulfil.

use async_trait::async_trait;
use thiserror::Error;

use crate::role::AssistantRole;

/// Errors returned by a completion backend.
///
/// The engine treats every variant as fatal for the run that triggered the
/// call; retries and timeouts are the provider's own concern.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transport-level failure talking to the provider.
    #[error("request to completion provider failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("completion provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response parsed but carried no usable completion text.
    #[error("completion response contained no content")]
    MissingContent,
}

/// A client that turns a prompt plus a role into one completion string.
///
/// Implementations must be shareable across runs (`Send + Sync`); the
/// engine issues at most one in-flight request per node.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` under the system-prompt preset selected by `role`.
    async fn complete(&self, prompt: &str, role: AssistantRole) -> Result<String, AiError>;
}
