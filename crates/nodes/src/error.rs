//! Node-level error type.

use thiserror::Error;

use ai::AiError;

/// Errors returned by a node's `execute` method.
///
/// Every variant is fatal for the run: the engine stops at the first
/// failing node and marks the execution failed.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The completion provider rejected or failed the request.
    #[error("AI completion failed: {0}")]
    Completion(#[from] AiError),

    /// Any other unrecoverable executor failure.
    #[error("{0}")]
    Fatal(String),
}
