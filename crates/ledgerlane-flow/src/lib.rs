//! Ledgerlane — Flow Orchestrator.
//!
//! The façade a transport talks to. Each game step is validated by the turn
//! coordinator, priced by the rule engine, recorded by the state
//! synchronizer and announced in a bounded per-room event log, all under a
//! per-room guard so steps on one room never interleave.

pub mod application;
pub mod domain;

pub use application::FlowOrchestrator;
