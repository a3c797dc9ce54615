//! Turn coordination service.

pub mod coordinator;

pub use coordinator::TurnCoordinator;
