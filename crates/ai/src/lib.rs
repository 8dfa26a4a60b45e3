//! `ai` crate — the completion client used by assistant and custom nodes.
//!
//! The engine talks to exactly one seam: [`CompletionClient`], which turns a
//! prompt plus an [`AssistantRole`] into a single completion string.  The
//! role selects a fixed system-prompt preset; provider failures surface as
//! [`AiError`] and are fatal for the run that triggered them.

pub mod client;
pub mod mock;
pub mod openai;
pub mod role;

pub use client::{AiError, CompletionClient};
pub use mock::MockCompletionClient;
pub use openai::{AiConfig, OpenAiClient};
pub use role::AssistantRole;
