//! Commands accepted by the room registry.

use ledgerlane_core::ids::{PlayerId, RoomId};

/// Default number of seats in a room.
pub const DEFAULT_CAPACITY: usize = 4;

/// Command to open a new room with the caller as host.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    /// The creating player, who becomes host.
    pub host_id: PlayerId,
    /// Display name for the host. Derived from the id when absent.
    pub host_name: Option<String>,
    /// Display name of the room.
    pub room_name: String,
    /// Maximum number of members.
    pub capacity: usize,
}

impl CreateRoom {
    /// A create command with the default capacity and a derived host name.
    #[must_use]
    pub fn new(host_id: impl Into<PlayerId>, room_name: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            host_name: None,
            room_name: room_name.into(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Overrides the capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Display name the host will carry in the room.
    #[must_use]
    pub fn resolved_host_name(&self) -> String {
        self.host_name.clone().unwrap_or_else(|| {
            let prefix: String = self.host_id.as_str().chars().take(6).collect();
            format!("Player_{prefix}")
        })
    }
}

/// Command to join an existing room.
#[derive(Debug, Clone)]
pub struct JoinRoom {
    /// The room to join.
    pub room_id: RoomId,
    /// The joining player.
    pub player_id: PlayerId,
    /// Display name of the joining player.
    pub player_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_name_derived_from_id_prefix() {
        let command = CreateRoom::new("abcdef123", "Table");
        assert_eq!(command.resolved_host_name(), "Player_abcdef");
    }

    #[test]
    fn test_explicit_host_name_wins() {
        let mut command = CreateRoom::new("h", "Table");
        command.host_name = Some("Hana".to_owned());
        assert_eq!(command.resolved_host_name(), "Hana");
        assert_eq!(command.capacity, DEFAULT_CAPACITY);
    }
}
