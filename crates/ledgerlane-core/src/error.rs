//! Game coordination error types.

use thiserror::Error;

use crate::ids::{PlayerId, RoomId};

/// Coarse error taxonomy used by transports to pick a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A room, player or turn does not exist.
    NotFound,
    /// The caller may not perform this action (wrong turn, not host, gate closed).
    PermissionDenied,
    /// The action is out of order for the current turn or game phase.
    SequenceViolation,
    /// The action cooldown has not elapsed.
    RateLimited,
    /// The request conflicts with existing membership or inconsistent state.
    Conflict,
    /// The request itself is malformed.
    Validation,
}

/// Top-level error type returned by every coordination service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The room does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// The player is not registered in any room, or not in the given one.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// No turn state has been allocated for the room yet.
    #[error("turn state not initialized for room {0}")]
    TurnNotInitialized(RoomId),

    /// The room is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already a member of this room.
    #[error("player {player_id} is already a member of room {room_id}")]
    AlreadyMember {
        /// The room that was joined.
        room_id: RoomId,
        /// The duplicate player.
        player_id: PlayerId,
    },

    /// The player is registered in a different room.
    #[error("player {player_id} is already registered in room {room_id}")]
    AlreadyInRoom {
        /// The room the player currently occupies.
        room_id: RoomId,
        /// The player.
        player_id: PlayerId,
    },

    /// The caller is not allowed to perform the action.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The action is out of sequence.
    #[error("sequence violation: {0}")]
    SequenceViolation(String),

    /// The action arrived before the cooldown elapsed.
    #[error("rate limited: retry in {remaining_ms} ms")]
    RateLimited {
        /// Milliseconds until the next action is accepted.
        remaining_ms: u64,
    },

    /// State consistency check failures, surfaced rather than repaired.
    #[error("state conflict: {0}")]
    Conflict(String),

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),
}

impl GameError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_) | Self::PlayerNotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::TurnNotInitialized(_) | Self::SequenceViolation(_) => {
                ErrorKind::SequenceViolation
            }
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::RoomFull(_)
            | Self::AlreadyMember { .. }
            | Self::AlreadyInRoom { .. }
            | Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_kind_groups_membership_failures_as_conflict() {
        let room_id = Uuid::new_v4();
        assert_eq!(GameError::RoomFull(room_id).kind(), ErrorKind::Conflict);
        assert_eq!(
            GameError::AlreadyMember {
                room_id,
                player_id: PlayerId::from("p2"),
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_uninitialized_turn_is_a_sequence_violation() {
        assert_eq!(
            GameError::TurnNotInitialized(Uuid::new_v4()).kind(),
            ErrorKind::SequenceViolation
        );
    }

    #[test]
    fn test_rate_limited_message_carries_remaining_time() {
        let err = GameError::RateLimited { remaining_ms: 120 };
        assert_eq!(err.to_string(), "rate limited: retry in 120 ms");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }
}
