//! The state synchronizer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ledgerlane_core::bounded::BoundedLog;
use ledgerlane_core::clock::Clock;
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::metrics::{DecisionEffect, MetricsPatch, PlayerMetrics};
use ledgerlane_core::outcomes::{AuditOutcome, SettlementFigures};
use ledgerlane_rooms::RoomRegistry;
use ledgerlane_rooms::domain::game_state::{
    AuditRecord, Decision, DecisionRecord, FINAL_YEAR, FIRST_YEAR, SettlementRecord,
};
use ledgerlane_rooms::domain::room::Room;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::snapshot::{
    ConflictRecord, ConsistencyReport, PlayerView, ResolutionStrategy, StateSnapshot, SyncView,
};

/// Maximum number of snapshots retained per room.
pub const SNAPSHOT_CAPACITY: usize = 100;

/// Maximum number of conflicts retained across all rooms.
pub const CONFLICT_LOG_CAPACITY: usize = 1000;

/// Snapshots returned by [`StateSynchronizer::state_history`] when no limit
/// is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

struct SyncInner {
    snapshots: HashMap<RoomId, BoundedLog<StateSnapshot>>,
    last_sync: HashMap<RoomId, DateTime<Utc>>,
    conflicts: BoundedLog<ConflictRecord>,
}

/// Owns per-room snapshot history and the global conflict log, and writes
/// player data into the registry's rooms.
pub struct StateSynchronizer {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
    inner: Mutex<SyncInner>,
}

impl std::fmt::Debug for StateSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSynchronizer").finish_non_exhaustive()
    }
}

impl StateSynchronizer {
    #[must_use]
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            clock,
            inner: Mutex::new(SyncInner {
                snapshots: HashMap::new(),
                last_sync: HashMap::new(),
                conflicts: BoundedLog::with_capacity(CONFLICT_LOG_CAPACITY),
            }),
        }
    }

    /// Mutates the room under the registry lock, then records a snapshot of
    /// the result. The synchronizer lock is held throughout so snapshots land
    /// in write order.
    fn write<R>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut Room, DateTime<Utc>) -> R,
    ) -> Result<R, GameError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now();
        let (result, snapshot) = self.registry.with_room_mut(room_id, |room| {
            let result = f(room, now);
            (result, StateSnapshot::capture(room, now))
        })?;
        inner
            .snapshots
            .entry(room_id)
            .or_insert_with(|| BoundedLog::with_capacity(SNAPSHOT_CAPACITY))
            .push(snapshot);
        inner.last_sync.insert(room_id, now);
        debug!(%room_id, "state snapshot captured");
        Ok(result)
    }

    /// Merges `patch` into the player's metrics and stamps `updated_at`.
    /// Players without metrics start from zeroed metrics.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn sync_player_data(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        patch: &MetricsPatch,
    ) -> Result<PlayerMetrics, GameError> {
        self.write(room_id, |room, now| {
            let metrics = room
                .game_state
                .players
                .entry(player_id.clone())
                .or_default();
            patch.apply_to(metrics);
            metrics.updated_at = Some(now);
            metrics.clone()
        })
    }

    /// Drops a player's metrics from the mirror.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn remove_player_data(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<Option<PlayerMetrics>, GameError> {
        self.write(room_id, |room, _| room.game_state.players.remove(player_id))
    }

    /// Appends a decision to the room's decision log.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn record_decision(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        decision: Decision,
        effects: DecisionEffect,
    ) -> Result<DecisionRecord, GameError> {
        self.write(room_id, |room, now| {
            let record = DecisionRecord {
                player_id: player_id.clone(),
                player_name: room.member_name(player_id),
                decision,
                effects,
                recorded_at: now,
            };
            room.game_state.decisions.push(record.clone());
            record
        })
    }

    /// Appends an audit to the room's audit log.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn record_audit(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        outcome: AuditOutcome,
    ) -> Result<AuditRecord, GameError> {
        self.write(room_id, |room, now| {
            let record = AuditRecord {
                player_id: player_id.clone(),
                player_name: room.member_name(player_id),
                outcome,
                recorded_at: now,
            };
            room.game_state.audits.push(record.clone());
            record
        })
    }

    /// Appends a settlement to the room's settlement log.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn record_settlement(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        figures: SettlementFigures,
    ) -> Result<SettlementRecord, GameError> {
        self.write(room_id, |room, now| {
            let record = SettlementRecord {
                player_id: player_id.clone(),
                player_name: room.member_name(player_id),
                figures,
                recorded_at: now,
            };
            room.game_state.settlements.push(record.clone());
            record
        })
    }

    /// The player's decisions in insertion order. Empty for unknown rooms.
    #[must_use]
    pub fn player_decisions(&self, room_id: RoomId, player_id: &PlayerId) -> Vec<DecisionRecord> {
        self.registry
            .with_room(room_id, |room| {
                room.game_state
                    .decisions
                    .iter()
                    .filter(|d| &d.player_id == player_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn player_audits(&self, room_id: RoomId, player_id: &PlayerId) -> Vec<AuditRecord> {
        self.registry
            .with_room(room_id, |room| {
                room.game_state
                    .audits
                    .iter()
                    .filter(|a| &a.player_id == player_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn player_settlements(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Vec<SettlementRecord> {
        self.registry
            .with_room(room_id, |room| {
                room.game_state
                    .settlements
                    .iter()
                    .filter(|s| &s.player_id == player_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks the room for corruption and reports every violation found.
    /// Nothing is corrected.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn validate_state_consistency(&self, room_id: RoomId) -> Result<ConsistencyReport, GameError> {
        let report = self.registry.with_room(room_id, |room| {
            let mut errors = Vec::new();
            if !room.is_member(&room.current_turn) {
                errors.push(format!(
                    "current turn player {} is not in the room",
                    room.current_turn
                ));
            }
            let year = room.game_state.current_year;
            if !(FIRST_YEAR..=FINAL_YEAR).contains(&year) {
                errors.push(format!("year {year} is outside {FIRST_YEAR}..={FINAL_YEAR}"));
            }
            for player_id in room.game_state.players.keys() {
                if !room.is_member(player_id) {
                    errors.push(format!("metrics held for non-member {player_id}"));
                }
            }
            ConsistencyReport::from_errors(errors)
        })?;
        if !report.valid {
            warn!(%room_id, errors = ?report.errors, "room state inconsistent");
        }
        Ok(report)
    }

    /// Resolves a disagreement in the server's favour. Both states are logged.
    pub fn resolve_conflict(&self, room_id: RoomId, client_state: Value, server_state: Value) -> Value {
        let record = ConflictRecord {
            room_id,
            client_state,
            server_state: server_state.clone(),
            resolved_at: self.clock.now(),
            strategy: ResolutionStrategy::ServerPriority,
        };
        self.inner.lock().conflicts.push(record);
        debug!(%room_id, "conflict resolved with server priority");
        server_state
    }

    /// Every logged conflict, oldest first.
    #[must_use]
    pub fn conflict_log(&self) -> Vec<ConflictRecord> {
        self.inner.lock().conflicts.to_vec()
    }

    /// The complete view of the game for one player.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, or `GameError::PlayerNotFound` when
    /// the player is not a member.
    pub fn sync_view(&self, room_id: RoomId, player_id: &PlayerId) -> Result<SyncView, GameError> {
        let now = self.clock.now();
        self.registry.with_room(room_id, |room| -> Result<SyncView, GameError> {
            let player_name = room
                .member_name(player_id)
                .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
            Ok(SyncView {
                room_id,
                player_id: player_id.clone(),
                player_name,
                current_year: room.game_state.current_year,
                current_turn: room.current_turn.clone(),
                is_my_turn: &room.current_turn == player_id,
                game_state: room.game_state.clone(),
                players: PlayerView::of_room(room),
                generated_at: now,
            })
        })?
    }

    /// The newest `limit` snapshots of the room, oldest first.
    #[must_use]
    pub fn state_history(&self, room_id: RoomId, limit: usize) -> Vec<StateSnapshot> {
        self.inner
            .lock()
            .snapshots
            .get(&room_id)
            .map(|log| log.tail(limit))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn last_sync_time(&self, room_id: RoomId) -> Option<DateTime<Utc>> {
        self.inner.lock().last_sync.get(&room_id).copied()
    }

    /// Drops the room's snapshot history and sync time.
    pub fn clear_room_data(&self, room_id: RoomId) {
        let mut inner = self.inner.lock();
        inner.snapshots.remove(&room_id);
        inner.last_sync.remove(&room_id);
        debug!(%room_id, "sync data cleared");
    }
}
