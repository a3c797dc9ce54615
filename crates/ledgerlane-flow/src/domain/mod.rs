//! Flow domain model.

pub mod events;
pub mod stats;
