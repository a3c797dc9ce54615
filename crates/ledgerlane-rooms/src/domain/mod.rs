//! Room domain model.

pub mod commands;
pub mod events;
pub mod game_state;
pub mod room;
