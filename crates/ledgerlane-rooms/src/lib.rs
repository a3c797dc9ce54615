//! Ledgerlane — Room Registry.
//!
//! Owns room and membership lifecycle: create, join, leave, host
//! transfer, game start/end and turn rotation. Every other coordination
//! service asks the registry who is in a room and whose turn it is.

pub mod application;
pub mod domain;

pub use application::{Departure, RoomRegistry};
