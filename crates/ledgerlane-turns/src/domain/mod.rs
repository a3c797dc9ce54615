//! Turn domain model.

pub mod config;
pub mod turn_state;
