//! Built-in executors, one per node type.

mod assistant;
mod condition;
mod custom;
mod input;
mod output;

pub use assistant::AssistantExecutor;
pub use condition::ConditionExecutor;
pub use custom::CustomExecutor;
pub use input::InputExecutor;
pub use output::OutputExecutor;
