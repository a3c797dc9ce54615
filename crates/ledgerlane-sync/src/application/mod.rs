//! State synchronization service.

pub mod synchronizer;

pub use synchronizer::StateSynchronizer;
