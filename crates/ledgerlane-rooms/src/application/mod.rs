//! Room registry service.

pub mod registry;

pub use registry::{Departure, RoomRegistry};
