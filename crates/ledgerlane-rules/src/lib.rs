//! Ledgerlane — rule engine.
//!
//! The coordination services never compute game numbers themselves; they
//! call a [`RuleEngine`]. [`StandardRules`] is the rule set the server ships
//! with: decision effect tables, flow classification, tax rates, audit risk
//! and audit assessment.

pub mod audit;
pub mod effects;
pub mod engine;
pub mod standard;

pub use audit::AuditAssessment;
pub use engine::RuleEngine;
pub use standard::StandardRules;
