//! Synchronizer domain model.

pub mod snapshot;
