//! Engine-level error types.

use thiserror::Error;

use nodes::model::NodeType;
use nodes::NodeError;

use crate::store::StoreError;

/// Errors produced by the workflow engine (validation + execution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Validation errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("edge references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        node_id: String,
        side: &'static str,
    },

    /// The graph ordering traversal re-entered a node already on the
    /// current path.
    #[error("workflow graph contains a cycle")]
    CycleDetected,

    // ------ Execution errors ------

    /// No executor is registered for the node's type.
    #[error("no executor registered for '{node_type}' node '{node_id}'")]
    UnknownNodeType {
        node_id: String,
        node_type: NodeType,
    },

    /// A node failed; the whole run is aborted.
    #[error("node '{node_id}' failed: {source}")]
    NodeFailed {
        node_id: String,
        #[source]
        source: NodeError,
    },

    /// Cancellation was requested before this node started.
    #[error("run cancelled before node '{node_id}'")]
    Cancelled { node_id: String },

    /// Persistence error from the execution store.
    #[error("execution store error: {0}")]
    Store(#[from] StoreError),
}
