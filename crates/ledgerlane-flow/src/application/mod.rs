//! Game flow orchestration.

pub mod orchestrator;

pub use orchestrator::FlowOrchestrator;
