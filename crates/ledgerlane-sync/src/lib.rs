//! Ledgerlane — State Synchronizer.
//!
//! Keeps the server-authoritative copy of every player's metrics and the
//! append-only decision, audit and settlement logs inside each room's game
//! state, captures a bounded history of snapshots after every write, and
//! resolves client/server disagreements in the server's favour.

pub mod application;
pub mod domain;

pub use application::StateSynchronizer;
