/// Runtime orchestration module - Gateway
mod non_interactive;
mod orchestrator;

pub use non_interactive::{ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner, TurnRecord};
pub use orchestrator::Orchestrator;
