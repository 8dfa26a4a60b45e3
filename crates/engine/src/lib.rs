//! `engine` crate — workflow models, graph ordering, the run coordinator,
//! and the execution-store seam.

pub mod dag;
pub mod error;
pub mod executor;
pub mod models;
pub mod store;

pub use dag::execution_order;
pub use error::EngineError;
pub use executor::{default_registry, NodeRegistry, RunOutcome, WorkflowExecutor};
pub use models::{Workflow, WorkflowEdge};
pub use store::{
    ExecutionStore, MemoryExecutionStore, NodeRunStatus, RunStatus, StoreError,
};
