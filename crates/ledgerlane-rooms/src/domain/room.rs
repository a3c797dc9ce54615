//! Rooms and their members.

use chrono::{DateTime, Utc};
use ledgerlane_core::ids::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};

use super::game_state::GameState;

/// Lifecycle status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Connection status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Connected,
    Disconnected,
    Playing,
    Waiting,
}

/// A player seated in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Back-reference to the transport's session handle.
    pub session: Option<String>,
    pub status: MemberStatus,
    pub is_host: bool,
    pub joined_at: DateTime<Utc>,
}

/// A bounded group of players sharing one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub room_name: String,
    pub host_id: PlayerId,
    /// Members in join order.
    pub members: Vec<Member>,
    pub capacity: usize,
    pub status: RoomStatus,
    /// The player whose turn it is.
    pub current_turn: PlayerId,
    pub game_state: GameState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// The member with `player_id`, if seated here.
    #[must_use]
    pub fn member(&self, player_id: &PlayerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.player_id == player_id)
    }

    /// Whether `player_id` is seated here.
    #[must_use]
    pub fn is_member(&self, player_id: &PlayerId) -> bool {
        self.member(player_id).is_some()
    }

    /// Display name of `player_id`, if seated here.
    #[must_use]
    pub fn member_name(&self, player_id: &PlayerId) -> Option<String> {
        self.member(player_id).map(|m| m.player_name.clone())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }
}
