//! Snapshots, sync views and conflict records.

use chrono::{DateTime, Utc};
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_rooms::domain::game_state::GameState;
use ledgerlane_rooms::domain::room::{MemberStatus, Room};
use serde::Serialize;
use serde_json::Value;

/// Reduced view of a member carried in snapshots and sync views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub player_name: String,
    pub status: MemberStatus,
    pub is_host: bool,
}

impl PlayerView {
    pub(crate) fn of_room(room: &Room) -> Vec<Self> {
        room.members
            .iter()
            .map(|m| Self {
                player_id: m.player_id.clone(),
                player_name: m.player_name.clone(),
                status: m.status,
                is_host: m.is_host,
            })
            .collect()
    }
}

/// An immutable copy of a room's game state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub room_id: RoomId,
    pub taken_at: DateTime<Utc>,
    pub game_state: GameState,
    pub players: Vec<PlayerView>,
    pub current_turn: PlayerId,
}

impl StateSnapshot {
    pub(crate) fn capture(room: &Room, taken_at: DateTime<Utc>) -> Self {
        Self {
            room_id: room.room_id,
            taken_at,
            game_state: room.game_state.clone(),
            players: PlayerView::of_room(room),
            current_turn: room.current_turn.clone(),
        }
    }
}

/// Everything a client needs to redraw the game for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncView {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub current_year: u32,
    pub current_turn: PlayerId,
    pub is_my_turn: bool,
    pub game_state: GameState,
    pub players: Vec<PlayerView>,
    pub generated_at: DateTime<Utc>,
}

/// Conflict resolution strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    ServerPriority,
}

/// A logged disagreement between a client's view and the server's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictRecord {
    pub room_id: RoomId,
    pub client_state: Value,
    pub server_state: Value,
    pub resolved_at: DateTime<Utc>,
    pub strategy: ResolutionStrategy,
}

/// Result of a room consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ConsistencyReport {
    pub(crate) fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Converts an invalid report into an error.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Conflict` listing every violation.
    pub fn ensure_valid(&self) -> Result<(), GameError> {
        if self.valid {
            Ok(())
        } else {
            Err(GameError::Conflict(self.errors.join("; ")))
        }
    }
}
