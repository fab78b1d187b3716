/// Executor module - frame state machine over a SubpassGraph

pub mod pipeline_executor;

pub use pipeline_executor::*;
