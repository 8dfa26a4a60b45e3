//! `nodes` crate — the node model, the `NodeExecutor` trait, and the five
//! built-in executors.
//!
//! The engine crate dispatches execution through [`NodeExecutor`] trait
//! objects; everything a node needs at runtime travels in
//! [`ExecutionContext`].

pub mod condition;
pub mod error;
pub mod executors;
pub mod model;
pub mod result_map;
pub mod template;
pub mod traits;

pub use error::NodeError;
pub use model::{NodeData, NodeType, WorkflowNode};
pub use result_map::{ResultMap, INPUT_KEY};
pub use traits::{ExecutionContext, NodeExecutor};
