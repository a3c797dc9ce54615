//! Ledgerlane — Turn Coordinator.
//!
//! Enforces the per-room turn state machine (roll, then decide, then
//! settle or advance), forfeits idle turns on timeout and rate-limits
//! player actions. Turn rotation itself is delegated to the room registry.

pub mod application;
pub mod domain;

pub use application::TurnCoordinator;
