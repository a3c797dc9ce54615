//! Results returned by flow operations.

use chrono::{DateTime, Utc};
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::metrics::{DecisionEffect, PlayerMetrics};
use ledgerlane_rooms::domain::game_state::Decision;
use serde::Serialize;

/// One player's end-of-game summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub player_name: String,
    pub final_cash: i64,
    pub decisions: usize,
    pub audits: usize,
    pub total_penalties: i64,
}

/// Summary produced when a game is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub room_id: RoomId,
    pub total_turns: u64,
    pub final_year: u32,
    pub player_stats: Vec<PlayerStats>,
    pub ended_at: DateTime<Utc>,
}

/// Whether a game has reached its end, and who won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEndCheck {
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub winners: Vec<PlayerId>,
}

/// What a processed decision did to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub effects: DecisionEffect,
    pub metrics: PlayerMetrics,
}
