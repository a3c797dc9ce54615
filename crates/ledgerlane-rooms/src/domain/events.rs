//! Room-scoped events recorded by the registry.

use chrono::{DateTime, Utc};
use ledgerlane_core::ids::PlayerId;
use serde::{Deserialize, Serialize};

use super::game_state::GameStatePatch;

/// Event type identifier for [`RoomEventKind::PlayerJoined`].
pub const PLAYER_JOINED_EVENT_TYPE: &str = "player_joined";

/// Event type identifier for [`RoomEventKind::PlayerLeft`].
pub const PLAYER_LEFT_EVENT_TYPE: &str = "player_left";

/// Event type identifier for [`RoomEventKind::GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "game_started";

/// Event type identifier for [`RoomEventKind::TurnChanged`].
pub const TURN_CHANGED_EVENT_TYPE: &str = "turn_changed";

/// Event type identifier for [`RoomEventKind::StateUpdated`].
pub const STATE_UPDATED_EVENT_TYPE: &str = "state_updated";

/// Event type identifier for [`RoomEventKind::GameEnded`].
pub const GAME_ENDED_EVENT_TYPE: &str = "game_ended";

/// Event payload variants for the room registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEventKind {
    /// A player took a seat.
    PlayerJoined { player_name: String },
    /// A player left.
    PlayerLeft,
    /// The host started the game.
    GameStarted { players: usize },
    /// The turn passed to another member.
    TurnChanged { new_turn: PlayerId },
    /// The game state was patched.
    StateUpdated { patch: GameStatePatch },
    /// The game was finalized.
    GameEnded { final_year: u32, turn_count: u64 },
}

/// A room event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// The player the event concerns, if any.
    pub player_id: Option<PlayerId>,
    /// Event-specific payload.
    #[serde(flatten)]
    pub kind: RoomEventKind,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
}

impl RoomEvent {
    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match &self.kind {
            RoomEventKind::PlayerJoined { .. } => PLAYER_JOINED_EVENT_TYPE,
            RoomEventKind::PlayerLeft => PLAYER_LEFT_EVENT_TYPE,
            RoomEventKind::GameStarted { .. } => GAME_STARTED_EVENT_TYPE,
            RoomEventKind::TurnChanged { .. } => TURN_CHANGED_EVENT_TYPE,
            RoomEventKind::StateUpdated { .. } => STATE_UPDATED_EVENT_TYPE,
            RoomEventKind::GameEnded { .. } => GAME_ENDED_EVENT_TYPE,
        }
    }
}
