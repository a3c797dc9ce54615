//! Route modules organized by coordination service.

pub mod flow;
pub mod health;
pub mod players;
pub mod rooms;
pub mod sync;
pub mod turns;

use serde::Deserialize;

/// Request body naming the acting player.
#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    /// The acting player.
    pub player_id: String,
}

/// Query string accepted by paginated history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}
