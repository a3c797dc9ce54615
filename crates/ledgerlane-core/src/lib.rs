//! Ledgerlane Core — shared domain vocabulary.
//!
//! This crate defines the identifiers, error taxonomy, player metrics and
//! the determinism seams (clock, RNG, timeout scheduling) that every
//! coordination service depends on. It holds no game state of its own.

pub mod bounded;
pub mod clock;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod outcomes;
pub mod rng;
pub mod timer;
