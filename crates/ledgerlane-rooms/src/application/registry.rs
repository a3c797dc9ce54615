//! The room registry: room and membership lifecycle.
//!
//! All rooms, the player → room index and the per-room event logs live behind
//! a single mutex, so every operation observes and leaves a consistent view.

use std::collections::HashMap;
use std::sync::Arc;

use ledgerlane_core::bounded::BoundedLog;
use ledgerlane_core::clock::Clock;
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::commands::{CreateRoom, JoinRoom};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::game_state::{GameState, GameStatePatch};
use crate::domain::room::{Member, MemberStatus, Room, RoomStatus};

/// Maximum number of events retained per room.
pub const ROOM_EVENT_CAPACITY: usize = 1000;

/// Outcome of a player leaving their room.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    /// The room the player left.
    pub room_id: RoomId,
    /// The room after the departure; `None` when it was deleted.
    pub room: Option<Room>,
    /// The member promoted to host, if the host left.
    pub new_host: Option<PlayerId>,
    /// The member who now holds the turn, if the leaver held it.
    pub turn_passed_to: Option<PlayerId>,
}

impl Departure {
    /// Whether the room was deleted because nobody remained.
    #[must_use]
    pub fn room_closed(&self) -> bool {
        self.room.is_none()
    }
}

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<RoomId, Room>,
    player_rooms: HashMap<PlayerId, RoomId>,
    events: HashMap<RoomId, BoundedLog<RoomEvent>>,
}

impl RegistryInner {
    fn room_mut(&mut self, room_id: RoomId) -> Result<&mut Room, GameError> {
        self.rooms
            .get_mut(&room_id)
            .ok_or(GameError::RoomNotFound(room_id))
    }

    fn record(&mut self, room_id: RoomId, event: RoomEvent) {
        self.events
            .entry(room_id)
            .or_insert_with(|| BoundedLog::with_capacity(ROOM_EVENT_CAPACITY))
            .push(event);
    }

    fn ensure_unassigned(&self, player_id: &PlayerId, target: RoomId) -> Result<(), GameError> {
        match self.player_rooms.get(player_id) {
            Some(&current) if current == target => Err(GameError::AlreadyMember {
                room_id: target,
                player_id: player_id.clone(),
            }),
            Some(&current) => Err(GameError::AlreadyInRoom {
                room_id: current,
                player_id: player_id.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Owns every room in the process.
pub struct RoomRegistry {
    clock: Arc<dyn Clock>,
    inner: Mutex<RegistryInner>,
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.inner.lock().rooms.len())
            .finish_non_exhaustive()
    }
}

impl RoomRegistry {
    /// Creates an empty registry stamping times from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    fn event(&self, player_id: Option<PlayerId>, kind: RoomEventKind) -> RoomEvent {
        RoomEvent {
            player_id,
            kind,
            occurred_at: self.clock.now(),
        }
    }

    /// Opens a room with the creator as its sole, host member.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for an empty name or zero capacity, and
    /// `GameError::AlreadyInRoom` if the host already sits in another room.
    pub fn create_room(&self, command: &CreateRoom) -> Result<Room, GameError> {
        if command.capacity == 0 {
            return Err(GameError::Validation("capacity must be at least 1".to_owned()));
        }
        if command.room_name.trim().is_empty() {
            return Err(GameError::Validation("room name must not be empty".to_owned()));
        }

        let mut inner = self.inner.lock();
        if let Some(&current) = inner.player_rooms.get(&command.host_id) {
            return Err(GameError::AlreadyInRoom {
                room_id: current,
                player_id: command.host_id.clone(),
            });
        }

        let now = self.clock.now();
        let room = Room {
            room_id: Uuid::new_v4(),
            room_name: command.room_name.clone(),
            host_id: command.host_id.clone(),
            members: vec![Member {
                player_id: command.host_id.clone(),
                player_name: command.resolved_host_name(),
                session: None,
                status: MemberStatus::Connected,
                is_host: true,
                joined_at: now,
            }],
            capacity: command.capacity,
            status: RoomStatus::Waiting,
            current_turn: command.host_id.clone(),
            game_state: GameState::default(),
            created_at: now,
            updated_at: now,
        };

        inner
            .player_rooms
            .insert(command.host_id.clone(), room.room_id);
        inner.events.insert(
            room.room_id,
            BoundedLog::with_capacity(ROOM_EVENT_CAPACITY),
        );
        inner.rooms.insert(room.room_id, room.clone());

        info!(room_id = %room.room_id, host_id = %room.host_id, capacity = room.capacity, "room created");
        Ok(room)
    }

    /// Seats a player in a waiting room.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, `GameError::RoomFull`,
    /// `GameError::AlreadyMember`, `GameError::AlreadyInRoom`, or
    /// `GameError::SequenceViolation` once the game has started.
    pub fn join_room(&self, command: &JoinRoom) -> Result<Room, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.ensure_unassigned(&command.player_id, command.room_id)?;

        let room = inner.room_mut(command.room_id)?;
        if room.status != RoomStatus::Waiting {
            return Err(GameError::SequenceViolation(
                "cannot join a room after the game has started".to_owned(),
            ));
        }
        if room.is_full() {
            return Err(GameError::RoomFull(command.room_id));
        }

        room.members.push(Member {
            player_id: command.player_id.clone(),
            player_name: command.player_name.clone(),
            session: None,
            status: MemberStatus::Connected,
            is_host: false,
            joined_at: now,
        });
        room.updated_at = now;
        let snapshot = room.clone();

        inner
            .player_rooms
            .insert(command.player_id.clone(), command.room_id);
        let event = self.event(
            Some(command.player_id.clone()),
            RoomEventKind::PlayerJoined {
                player_name: command.player_name.clone(),
            },
        );
        inner.record(command.room_id, event);

        info!(room_id = %command.room_id, player_id = %command.player_id, "player joined room");
        Ok(snapshot)
    }

    /// Removes a player from whichever room they occupy.
    ///
    /// Returns `None` when the player is not in any room.
    pub fn leave_room(&self, player_id: &PlayerId) -> Option<Departure> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room_id = inner.player_rooms.remove(player_id)?;
        let left = self.event(Some(player_id.clone()), RoomEventKind::PlayerLeft);

        let room = inner.rooms.get_mut(&room_id)?;
        let index = room
            .members
            .iter()
            .position(|m| &m.player_id == player_id)?;
        room.members.remove(index);
        room.updated_at = now;

        if room.members.is_empty() {
            inner.rooms.remove(&room_id);
            inner.events.remove(&room_id);
            info!(%room_id, %player_id, "last member left, room deleted");
            return Some(Departure {
                room_id,
                room: None,
                new_host: None,
                turn_passed_to: None,
            });
        }

        let mut new_host = None;
        if &room.host_id == player_id {
            let successor = &mut room.members[0];
            successor.is_host = true;
            room.host_id = successor.player_id.clone();
            new_host = Some(room.host_id.clone());
        }

        let mut turn_passed_to = None;
        if &room.current_turn == player_id {
            let follower = index % room.members.len();
            room.current_turn = room.members[follower].player_id.clone();
            turn_passed_to = Some(room.current_turn.clone());
        }
        let snapshot = room.clone();

        inner.record(room_id, left);
        if let Some(next) = &turn_passed_to {
            let event = self.event(
                None,
                RoomEventKind::TurnChanged {
                    new_turn: next.clone(),
                },
            );
            inner.record(room_id, event);
        }

        info!(%room_id, %player_id, new_host = ?new_host, "player left room");
        Some(Departure {
            room_id,
            room: Some(snapshot),
            new_host,
            turn_passed_to,
        })
    }

    /// Moves a waiting room into play. The first member takes the first turn.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, `GameError::PermissionDenied` when
    /// the caller is not the host, or `GameError::SequenceViolation` when the
    /// room is not waiting.
    pub fn start_game(&self, room_id: RoomId, host_id: &PlayerId) -> Result<Room, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room = inner.room_mut(room_id)?;
        if &room.host_id != host_id {
            return Err(GameError::PermissionDenied(
                "only the host can start the game".to_owned(),
            ));
        }
        if room.status != RoomStatus::Waiting {
            return Err(GameError::SequenceViolation(
                "game has already started".to_owned(),
            ));
        }

        room.status = RoomStatus::Playing;
        room.current_turn = room.members[0].player_id.clone();
        for member in &mut room.members {
            member.status = MemberStatus::Playing;
        }
        room.updated_at = now;
        let snapshot = room.clone();

        let event = self.event(
            None,
            RoomEventKind::GameStarted {
                players: snapshot.members.len(),
            },
        );
        inner.record(room_id, event);

        info!(%room_id, players = snapshot.members.len(), "game started");
        Ok(snapshot)
    }

    /// Shallow-merges `patch` into the room's game state.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn update_game_state(
        &self,
        room_id: RoomId,
        patch: GameStatePatch,
    ) -> Result<Room, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room = inner.room_mut(room_id)?;
        room.game_state.merge(&patch);
        room.updated_at = now;
        let snapshot = room.clone();

        let event = self.event(None, RoomEventKind::StateUpdated { patch });
        inner.record(room_id, event);
        debug!(%room_id, "game state updated");
        Ok(snapshot)
    }

    /// Rotates the turn to the next member in join order and bumps the turn
    /// counter.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn next_turn(&self, room_id: RoomId) -> Result<PlayerId, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room = inner.room_mut(room_id)?;

        let next_index = room
            .members
            .iter()
            .position(|m| m.player_id == room.current_turn)
            .map_or(0, |i| (i + 1) % room.members.len());
        room.current_turn = room.members[next_index].player_id.clone();
        room.game_state.turn_count += 1;
        room.updated_at = now;
        let next = room.current_turn.clone();

        let event = self.event(
            None,
            RoomEventKind::TurnChanged {
                new_turn: next.clone(),
            },
        );
        inner.record(room_id, event);
        Ok(next)
    }

    /// Marks the room finished. The room stays queryable.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn end_game(&self, room_id: RoomId) -> Result<Room, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room = inner.room_mut(room_id)?;
        room.status = RoomStatus::Finished;
        room.updated_at = now;
        let snapshot = room.clone();

        let event = self.event(
            None,
            RoomEventKind::GameEnded {
                final_year: snapshot.game_state.current_year,
                turn_count: snapshot.game_state.turn_count,
            },
        );
        inner.record(room_id, event);
        info!(%room_id, "game finished");
        Ok(snapshot)
    }

    #[must_use]
    pub fn get_room(&self, room_id: RoomId) -> Option<Room> {
        self.inner.lock().rooms.get(&room_id).cloned()
    }

    /// Rooms still accepting players, oldest first.
    #[must_use]
    pub fn list_waiting_rooms(&self) -> Vec<Room> {
        let inner = self.inner.lock();
        let mut rooms: Vec<Room> = inner
            .rooms
            .values()
            .filter(|r| r.status == RoomStatus::Waiting)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.created_at);
        rooms
    }

    #[must_use]
    pub fn get_player_room(&self, player_id: &PlayerId) -> Option<Room> {
        let inner = self.inner.lock();
        let room_id = inner.player_rooms.get(player_id)?;
        inner.rooms.get(room_id).cloned()
    }

    /// Event history of a room, oldest first. Empty for unknown rooms.
    #[must_use]
    pub fn room_events(&self, room_id: RoomId) -> Vec<RoomEvent> {
        self.inner
            .lock()
            .events
            .get(&room_id)
            .map(BoundedLog::to_vec)
            .unwrap_or_default()
    }

    /// Attaches a transport session handle to the player's membership.
    ///
    /// Returns `false` when the player is not seated anywhere.
    pub fn update_player_session(&self, player_id: &PlayerId, session: impl Into<String>) -> bool {
        let mut inner = self.inner.lock();
        let Some(&room_id) = inner.player_rooms.get(player_id) else {
            return false;
        };
        let Some(member) = inner
            .rooms
            .get_mut(&room_id)
            .and_then(|r| r.members.iter_mut().find(|m| &m.player_id == player_id))
        else {
            return false;
        };
        member.session = Some(session.into());
        true
    }

    /// Session handles of every member that has one.
    #[must_use]
    pub fn room_sessions(&self, room_id: RoomId) -> Vec<String> {
        self.inner
            .lock()
            .rooms
            .get(&room_id)
            .map(|r| r.members.iter().filter_map(|m| m.session.clone()).collect())
            .unwrap_or_default()
    }

    /// Updates a member's connection status.
    ///
    /// # Errors
    ///
    /// Returns `GameError::PlayerNotFound` if the player is not in any room.
    pub fn set_member_status(
        &self,
        player_id: &PlayerId,
        status: MemberStatus,
    ) -> Result<(), GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room_id = *inner
            .player_rooms
            .get(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
        let room = inner.room_mut(room_id)?;
        let member = room
            .members
            .iter_mut()
            .find(|m| &m.player_id == player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
        member.status = status;
        room.updated_at = now;
        debug!(%room_id, %player_id, ?status, "member status changed");
        Ok(())
    }

    /// Whether at least one member is not disconnected.
    #[must_use]
    pub fn has_connected_players(&self, room_id: RoomId) -> bool {
        self.inner.lock().rooms.get(&room_id).is_some_and(|r| {
            r.members
                .iter()
                .any(|m| m.status != MemberStatus::Disconnected)
        })
    }

    /// Runs `f` against the room while the registry lock is held.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn with_room<R>(&self, room_id: RoomId, f: impl FnOnce(&Room) -> R) -> Result<R, GameError> {
        let inner = self.inner.lock();
        let room = inner
            .rooms
            .get(&room_id)
            .ok_or(GameError::RoomNotFound(room_id))?;
        Ok(f(room))
    }

    /// Runs `f` against the room mutably while the registry lock is held and
    /// stamps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn with_room_mut<R>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut Room) -> R,
    ) -> Result<R, GameError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let room = inner.room_mut(room_id)?;
        let result = f(room);
        room.updated_at = now;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlane_test_support::{FixedClock, fixed_instant};

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(FixedClock(fixed_instant())))
    }

    fn join(registry: &RoomRegistry, room_id: RoomId, player: &str) -> Result<Room, GameError> {
        registry.join_room(&JoinRoom {
            room_id,
            player_id: PlayerId::from(player),
            player_name: player.to_uppercase(),
        })
    }

    fn ids(room: &Room) -> Vec<&str> {
        room.members.iter().map(|m| m.player_id.as_str()).collect()
    }

    #[test]
    fn test_create_room_seats_host() {
        let registry = registry();

        let room = registry.create_room(&CreateRoom::new("host01xyz", "Table")).unwrap();

        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.current_turn, PlayerId::from("host01xyz"));
        assert_eq!(room.members.len(), 1);
        assert!(room.members[0].is_host);
        assert_eq!(room.members[0].player_name, "Player_host01");
        assert_eq!(room.created_at, fixed_instant());
    }

    #[test]
    fn test_create_room_rejects_zero_capacity() {
        let registry = registry();

        let err = registry
            .create_room(&CreateRoom::new("h", "Table").with_capacity(0))
            .unwrap_err();

        assert!(matches!(err, GameError::Validation(_)));
    }

    #[test]
    fn test_create_room_rejects_player_seated_elsewhere() {
        let registry = registry();
        let first = registry.create_room(&CreateRoom::new("h", "One")).unwrap();

        let err = registry.create_room(&CreateRoom::new("h", "Two")).unwrap_err();

        assert_eq!(
            err,
            GameError::AlreadyInRoom {
                room_id: first.room_id,
                player_id: PlayerId::from("h"),
            }
        );
    }

    #[test]
    fn test_four_players_start_and_fifth_is_turned_away() {
        // Arrange
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        for player in ["p2", "p3", "p4"] {
            join(&registry, room.room_id, player).unwrap();
        }

        // Act
        let started = registry.start_game(room.room_id, &PlayerId::from("h")).unwrap();
        let fifth = join(&registry, room.room_id, "p5");

        // Assert
        assert_eq!(started.status, RoomStatus::Playing);
        assert_eq!(started.current_turn, PlayerId::from("h"));
        assert!(started.members.iter().all(|m| m.status == MemberStatus::Playing));
        assert!(fifth.is_err());
    }

    #[test]
    fn test_join_full_waiting_room_reports_full() {
        let registry = registry();
        let room = registry
            .create_room(&CreateRoom::new("h", "Table").with_capacity(2))
            .unwrap();
        join(&registry, room.room_id, "p2").unwrap();

        let err = join(&registry, room.room_id, "p3").unwrap_err();

        assert_eq!(err, GameError::RoomFull(room.room_id));
    }

    #[test]
    fn test_join_twice_reports_already_member() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        join(&registry, room.room_id, "p2").unwrap();

        let err = join(&registry, room.room_id, "p2").unwrap_err();

        assert!(matches!(err, GameError::AlreadyMember { .. }));
    }

    #[test]
    fn test_join_unknown_room_reports_not_found() {
        let registry = registry();
        let room_id = Uuid::new_v4();

        let err = join(&registry, room_id, "p2").unwrap_err();

        assert_eq!(err, GameError::RoomNotFound(room_id));
    }

    #[test]
    fn test_only_host_can_start() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        join(&registry, room.room_id, "p2").unwrap();

        let err = registry
            .start_game(room.room_id, &PlayerId::from("p2"))
            .unwrap_err();

        assert!(matches!(err, GameError::PermissionDenied(_)));
        assert_eq!(registry.get_room(room.room_id).unwrap().status, RoomStatus::Waiting);
    }

    #[test]
    fn test_host_leaving_promotes_earliest_joined() {
        // Arrange
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        join(&registry, room.room_id, "p2").unwrap();
        join(&registry, room.room_id, "p3").unwrap();

        // Act
        let departure = registry.leave_room(&PlayerId::from("h")).unwrap();

        // Assert
        let remaining = departure.room.as_ref().unwrap();
        assert!(!departure.room_closed());
        assert_eq!(departure.new_host, Some(PlayerId::from("p2")));
        assert_eq!(remaining.host_id, PlayerId::from("p2"));
        assert!(remaining.members[0].is_host);
        assert_eq!(ids(remaining), vec!["p2", "p3"]);
        assert!(registry.get_player_room(&PlayerId::from("h")).is_none());
    }

    #[test]
    fn test_leaving_turn_holder_passes_turn_to_follower() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        for player in ["p2", "p3"] {
            join(&registry, room.room_id, player).unwrap();
        }
        registry.start_game(room.room_id, &PlayerId::from("h")).unwrap();
        registry.next_turn(room.room_id).unwrap();
        registry.next_turn(room.room_id).unwrap();

        let departure = registry.leave_room(&PlayerId::from("p3")).unwrap();

        assert_eq!(departure.turn_passed_to, Some(PlayerId::from("h")));
        let events = registry.room_events(room.room_id);
        assert_eq!(events.last().unwrap().event_type(), "turn_changed");
    }

    #[test]
    fn test_last_member_leaving_deletes_room_and_events() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();

        let departure = registry.leave_room(&PlayerId::from("h")).unwrap();

        assert!(departure.room_closed());
        assert!(registry.get_room(room.room_id).is_none());
        assert!(registry.room_events(room.room_id).is_empty());
    }

    #[test]
    fn test_leave_without_room_is_none() {
        let registry = registry();
        assert!(registry.leave_room(&PlayerId::from("ghost")).is_none());
    }

    #[test]
    fn test_next_turn_wraps_and_counts() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        join(&registry, room.room_id, "p2").unwrap();
        registry.start_game(room.room_id, &PlayerId::from("h")).unwrap();

        let second = registry.next_turn(room.room_id).unwrap();
        let wrapped = registry.next_turn(room.room_id).unwrap();

        assert_eq!(second, PlayerId::from("p2"));
        assert_eq!(wrapped, PlayerId::from("h"));
        assert_eq!(registry.get_room(room.room_id).unwrap().game_state.turn_count, 2);
    }

    #[test]
    fn test_end_game_keeps_room_queryable() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();

        let ended = registry.end_game(room.room_id).unwrap();

        assert_eq!(ended.status, RoomStatus::Finished);
        assert!(registry.get_room(room.room_id).is_some());
        assert!(registry.list_waiting_rooms().is_empty());
    }

    #[test]
    fn test_update_game_state_records_event() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();

        let updated = registry
            .update_game_state(
                room.room_id,
                GameStatePatch {
                    current_year: Some(3),
                    ..GameStatePatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.game_state.current_year, 3);
        let events = registry.room_events(room.room_id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "state_updated");
    }

    #[test]
    fn test_room_events_are_capped() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();

        for _ in 0..=ROOM_EVENT_CAPACITY {
            registry.next_turn(room.room_id).unwrap();
        }

        assert_eq!(registry.room_events(room.room_id).len(), ROOM_EVENT_CAPACITY);
    }

    #[test]
    fn test_sessions_and_connection_tracking() {
        let registry = registry();
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        join(&registry, room.room_id, "p2").unwrap();

        assert!(registry.update_player_session(&PlayerId::from("p2"), "sock-2"));
        assert!(!registry.update_player_session(&PlayerId::from("ghost"), "sock-x"));
        assert_eq!(registry.room_sessions(room.room_id), vec!["sock-2".to_owned()]);

        registry
            .set_member_status(&PlayerId::from("h"), MemberStatus::Disconnected)
            .unwrap();
        assert!(registry.has_connected_players(room.room_id));
        registry
            .set_member_status(&PlayerId::from("p2"), MemberStatus::Disconnected)
            .unwrap();
        assert!(!registry.has_connected_players(room.room_id));
    }
}
