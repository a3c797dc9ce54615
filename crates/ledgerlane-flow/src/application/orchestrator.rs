//! The flow orchestrator.
//!
//! Public operations take the room's guard, owned by the turn coordinator so
//! that turn timeouts serialize with them, and then call into the turn
//! coordinator, the synchronizer and the registry. The guard is never
//! re-entered: helpers that run under it are suffixed `_locked`.

use std::collections::HashMap;
use std::sync::Arc;

use ledgerlane_core::bounded::BoundedLog;
use ledgerlane_core::clock::Clock;
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::metrics::{MetricsPatch, PlayerMetrics};
use ledgerlane_core::outcomes::{AuditOutcome, SettlementFigures};
use ledgerlane_core::rng::DeterministicRng;
use ledgerlane_rooms::RoomRegistry;
use ledgerlane_rooms::application::Departure;
use ledgerlane_rooms::domain::game_state::{Decision, FINAL_YEAR, GameStatePatch};
use ledgerlane_rooms::domain::room::{Room, RoomStatus};
use ledgerlane_rules::RuleEngine;
use ledgerlane_sync::StateSynchronizer;
use ledgerlane_turns::TurnCoordinator;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::events::{FlowEventKind, GameFlowEvent};
use crate::domain::stats::{DecisionResult, GameEndCheck, GameStats, PlayerStats};

/// Maximum number of flow events retained per room.
pub const FLOW_EVENT_CAPACITY: usize = 1000;

/// Events returned by [`FlowOrchestrator::game_events`] when no limit is given.
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// The services a [`FlowOrchestrator`] sequences.
pub struct FlowServices {
    pub registry: Arc<RoomRegistry>,
    pub coordinator: Arc<TurnCoordinator>,
    pub sync: Arc<StateSynchronizer>,
    pub rules: Arc<dyn RuleEngine>,
    pub rng: Box<dyn DeterministicRng>,
    pub clock: Arc<dyn Clock>,
}

/// Sequences full game steps across the coordination services.
pub struct FlowOrchestrator {
    registry: Arc<RoomRegistry>,
    coordinator: Arc<TurnCoordinator>,
    sync: Arc<StateSynchronizer>,
    rules: Arc<dyn RuleEngine>,
    rng: Mutex<Box<dyn DeterministicRng>>,
    clock: Arc<dyn Clock>,
    events: Mutex<HashMap<RoomId, BoundedLog<GameFlowEvent>>>,
}

impl std::fmt::Debug for FlowOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowOrchestrator").finish_non_exhaustive()
    }
}

impl FlowOrchestrator {
    #[must_use]
    pub fn new(services: FlowServices) -> Self {
        Self {
            registry: services.registry,
            coordinator: services.coordinator,
            sync: services.sync,
            rules: services.rules,
            rng: Mutex::new(services.rng),
            clock: services.clock,
            events: Mutex::new(HashMap::new()),
        }
    }

    fn room_guard(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        self.coordinator.room_lock(room_id)
    }

    fn emit(&self, room_id: RoomId, player_id: Option<PlayerId>, kind: FlowEventKind) {
        let event = GameFlowEvent {
            room_id,
            player_id,
            kind,
            occurred_at: self.clock.now(),
        };
        info!(%room_id, event_type = event.kind.event_type(), "flow event");
        self.events
            .lock()
            .entry(room_id)
            .or_insert_with(|| BoundedLog::with_capacity(FLOW_EVENT_CAPACITY))
            .push(event);
    }

    /// The player's metrics and the room's current year. Members without
    /// mirrored metrics read as the rule engine's starting metrics.
    fn player_context(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<(PlayerMetrics, u32), GameError> {
        let initial = self.rules.initial_metrics();
        self.registry.with_room(room_id, |room| {
            if !room.is_member(player_id) {
                return Err(GameError::PlayerNotFound(player_id.clone()));
            }
            let metrics = room
                .game_state
                .metrics(player_id)
                .cloned()
                .unwrap_or(initial);
            Ok((metrics, room.game_state.current_year))
        })?
    }

    /// Starts the game, seeds every member's metrics and opens the first turn.
    ///
    /// # Errors
    ///
    /// Forwards `RoomRegistry::start_game` failures.
    pub fn start_game(&self, room_id: RoomId, host_id: &PlayerId) -> Result<Room, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        let room = self.registry.start_game(room_id, host_id)?;
        let seed = MetricsPatch::replacing(&self.rules.initial_metrics());
        for member in &room.members {
            self.sync.sync_player_data(room_id, &member.player_id, &seed)?;
        }
        self.coordinator.initialize_turn_state(room_id)?;
        self.registry
            .get_room(room_id)
            .ok_or(GameError::RoomNotFound(room_id))
    }

    /// Removes a player from their room. A closed room is purged from every
    /// service; otherwise the leaver's metrics are dropped and, if they held
    /// the turn, a fresh turn is opened for the new holder.
    ///
    /// # Errors
    ///
    /// Forwards failures from re-syncing the remaining room.
    pub fn leave_room(&self, player_id: &PlayerId) -> Result<Option<Departure>, GameError> {
        let Some(room) = self.registry.get_player_room(player_id) else {
            return Ok(None);
        };
        let guard = self.room_guard(room.room_id);
        let _held = guard.lock();

        let Some(departure) = self.registry.leave_room(player_id) else {
            return Ok(None);
        };
        let room_id = departure.room_id;
        match &departure.room {
            None => {
                self.coordinator.clear_room(room_id);
                self.sync.clear_room_data(room_id);
                self.clear_room_events(room_id);
                self.coordinator.release_room_lock(room_id);
            }
            Some(remaining) => {
                self.sync.remove_player_data(room_id, player_id)?;
                if departure.turn_passed_to.is_some() && remaining.status == RoomStatus::Playing {
                    self.coordinator.initialize_turn_state(room_id)?;
                }
            }
        }
        Ok(Some(departure))
    }

    /// Rolls the dice for the turn holder.
    ///
    /// # Errors
    ///
    /// Forwards the coordinator's roll check and cooldown failures.
    pub fn roll_dice(&self, room_id: RoomId, player_id: &PlayerId) -> Result<u32, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        self.coordinator.can_roll_dice(room_id, player_id)?;
        self.coordinator.validate_action_frequency(room_id, player_id)?;
        let dice = self.rng.lock().next_u32_range(1, 6);
        self.coordinator.record_dice_roll(room_id, player_id, dice)?;
        Ok(dice)
    }

    /// Records a decision and applies its effects to the player's metrics.
    ///
    /// # Errors
    ///
    /// Forwards the first failing check: decision gate, cooldown, membership.
    pub fn process_decision(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        decision: Decision,
    ) -> Result<DecisionResult, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        self.coordinator.can_make_decision(room_id, player_id)?;
        self.coordinator.validate_action_frequency(room_id, player_id)?;
        let (metrics, _) = self.player_context(room_id, player_id)?;

        let payload = serde_json::to_value(&decision)
            .map_err(|e| GameError::Validation(format!("unencodable decision: {e}")))?;
        self.coordinator.record_decision(room_id, player_id, payload)?;
        let effects = self.rules.decision_effect(&decision.grid_type, &decision.choice);
        self.sync
            .record_decision(room_id, player_id, decision.clone(), effects)?;

        let updated = self.rules.apply_decision_effect(&metrics, &effects);
        let metrics = self
            .sync
            .sync_player_data(room_id, player_id, &MetricsPatch::replacing(&updated))?;

        self.emit(
            room_id,
            Some(player_id.clone()),
            FlowEventKind::DecisionMade {
                decision: decision.clone(),
                effects,
            },
        );
        Ok(DecisionResult {
            decision,
            effects,
            metrics,
        })
    }

    /// Settles the player's year once everyone else has settled.
    ///
    /// # Errors
    ///
    /// Returns `GameError::PermissionDenied` while others are pending and
    /// `GameError::SequenceViolation` when the player already settled.
    pub fn process_annual_settlement(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<SettlementFigures, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        self.coordinator.can_annual_settle(room_id, player_id)?;
        let (metrics, year) = self.player_context(room_id, player_id)?;
        if metrics.settled_this_year {
            return Err(GameError::SequenceViolation(format!(
                "{player_id} already settled year {year}"
            )));
        }

        let figures = self.rules.settle_year(&metrics, year);
        let payload = serde_json::to_value(&figures)
            .map_err(|e| GameError::Validation(format!("unencodable settlement: {e}")))?;
        self.coordinator.record_settlement(room_id, player_id, payload)?;
        self.sync
            .record_settlement(room_id, player_id, figures.clone())?;
        self.sync.sync_player_data(
            room_id,
            player_id,
            &MetricsPatch {
                cash: Some(figures.final_balance),
                year: Some(year),
                settled_this_year: Some(true),
                ..MetricsPatch::default()
            },
        )?;

        self.emit(
            room_id,
            Some(player_id.clone()),
            FlowEventKind::SettlementCompleted(figures.clone()),
        );
        Ok(figures)
    }

    /// Records an externally parameterized audit and debits any penalty.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for a negative penalty, otherwise
    /// `GameError::RoomNotFound` or `GameError::PlayerNotFound`.
    pub fn process_audit(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        audit: AuditOutcome,
    ) -> Result<AuditOutcome, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();
        self.process_audit_locked(room_id, player_id, audit)
    }

    fn process_audit_locked(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        audit: AuditOutcome,
    ) -> Result<AuditOutcome, GameError> {
        if audit.penalty_amount.is_some_and(|p| p < 0) {
            return Err(GameError::Validation(
                "audit penalty must not be negative".to_owned(),
            ));
        }
        let (metrics, _) = self.player_context(room_id, player_id)?;
        self.sync.record_audit(room_id, player_id, audit.clone())?;
        if let Some(penalty) = audit.penalty_amount.filter(|p| *p != 0) {
            self.sync.sync_player_data(
                room_id,
                player_id,
                &MetricsPatch {
                    cash: Some(metrics.cash.saturating_sub(penalty)),
                    ..MetricsPatch::default()
                },
            )?;
        }
        self.emit(
            room_id,
            Some(player_id.clone()),
            FlowEventKind::AuditTriggered(audit.clone()),
        );
        Ok(audit)
    }

    /// Draws an audit sample for the player and, if the rule engine says the
    /// audit fires, grades and records it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` or `GameError::PlayerNotFound`.
    pub fn run_audit_check(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<Option<AuditOutcome>, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        let (metrics, year) = self.player_context(room_id, player_id)?;
        let flow = self.rules.classify_flow(metrics.compliance, metrics.risk);
        let sample = self.rng.lock().next_f64();
        if !self.rules.should_trigger_audit(flow, sample) {
            return Ok(None);
        }
        let income = self.rules.annual_income(&metrics);
        let outcome = self.rules.assess_audit(&metrics, income).into_outcome(year);
        self.process_audit_locked(room_id, player_id, outcome).map(Some)
    }

    /// Ends the caller's completed turn.
    ///
    /// # Errors
    ///
    /// Forwards `TurnCoordinator::next_turn` failures.
    pub fn end_turn(&self, room_id: RoomId, player_id: &PlayerId) -> Result<PlayerId, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();
        self.coordinator.next_turn(room_id, player_id)
    }

    /// Forfeits the current turn, serialized with every other step on the
    /// room.
    ///
    /// # Errors
    ///
    /// Forwards `TurnCoordinator::skip_turn` failures.
    pub fn skip_turn(&self, room_id: RoomId) -> Result<PlayerId, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();
        self.coordinator.skip_turn(room_id)
    }

    /// Moves the room into the next year.
    ///
    /// # Errors
    ///
    /// Returns `GameError::SequenceViolation` in the final year.
    pub fn advance_year(&self, room_id: RoomId) -> Result<u32, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        let (year, players) = self.registry.with_room(room_id, |room| {
            (
                room.game_state.current_year,
                room.game_state.players.keys().cloned().collect::<Vec<_>>(),
            )
        })?;
        if year >= FINAL_YEAR {
            return Err(GameError::SequenceViolation(format!(
                "year {FINAL_YEAR} is the final year"
            )));
        }

        let new_year = year + 1;
        self.registry.update_game_state(
            room_id,
            GameStatePatch {
                current_year: Some(new_year),
                turn_count: Some(0),
                ..GameStatePatch::default()
            },
        )?;
        let reset = MetricsPatch {
            settled_this_year: Some(false),
            ..MetricsPatch::default()
        };
        for player_id in &players {
            self.sync.sync_player_data(room_id, player_id, &reset)?;
        }

        self.emit(room_id, None, FlowEventKind::YearAdvanced { new_year });
        Ok(new_year)
    }

    /// Reports whether the game is over. Bankrupt or criminally liable
    /// players are named in the reason without ending the game.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn check_game_end(&self, room_id: RoomId) -> Result<GameEndCheck, GameError> {
        self.registry.with_room(room_id, |room| {
            let players = &room.game_state.players;
            if room.game_state.current_year >= FINAL_YEAR {
                let top = players.values().map(|m| m.cash).max();
                let winners = players
                    .iter()
                    .filter(|(_, m)| Some(m.cash) == top)
                    .map(|(id, _)| id.clone())
                    .collect();
                return GameEndCheck {
                    ended: true,
                    reason: Some(format!("completed {FINAL_YEAR} years")),
                    winners,
                };
            }

            let mut flags = Vec::new();
            for (id, metrics) in players {
                if self.rules.is_bankrupt(metrics.cash) {
                    flags.push(format!("player {id} is bankrupt"));
                }
                if self.rules.should_trigger_criminal(metrics.compliance) {
                    flags.push(format!("player {id} faces criminal liability"));
                }
            }
            GameEndCheck {
                ended: false,
                reason: (!flags.is_empty()).then(|| flags.join("; ")),
                winners: Vec::new(),
            }
        })
    }

    /// Finalizes the game and purges turn and sync state for the room.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn end_game(&self, room_id: RoomId) -> Result<GameStats, GameError> {
        let guard = self.room_guard(room_id);
        let _held = guard.lock();

        let stats = self.registry.with_room(room_id, |room| {
            let state = &room.game_state;
            let player_stats = room
                .members
                .iter()
                .map(|member| {
                    let audits: Vec<_> = state
                        .audits
                        .iter()
                        .filter(|a| a.player_id == member.player_id)
                        .collect();
                    PlayerStats {
                        player_id: member.player_id.clone(),
                        player_name: member.player_name.clone(),
                        final_cash: state.metrics(&member.player_id).map_or(0, |m| m.cash),
                        decisions: state
                            .decisions
                            .iter()
                            .filter(|d| d.player_id == member.player_id)
                            .count(),
                        audits: audits.len(),
                        total_penalties: audits
                            .iter()
                            .filter_map(|a| a.outcome.penalty_amount)
                            .fold(0_i64, i64::saturating_add),
                    }
                })
                .collect();
            GameStats {
                room_id,
                total_turns: state.turn_count,
                final_year: state.current_year,
                player_stats,
                ended_at: self.clock.now(),
            }
        })?;

        self.registry.end_game(room_id)?;
        self.coordinator.clear_room(room_id);
        self.sync.clear_room_data(room_id);
        self.emit(room_id, None, FlowEventKind::GameEnded(stats.clone()));
        Ok(stats)
    }

    /// The newest `limit` events of the room, oldest first.
    #[must_use]
    pub fn game_events(&self, room_id: RoomId, limit: usize) -> Vec<GameFlowEvent> {
        self.events
            .lock()
            .get(&room_id)
            .map(|log| log.tail(limit))
            .unwrap_or_default()
    }

    pub fn clear_room_events(&self, room_id: RoomId) {
        if self.events.lock().remove(&room_id).is_some() {
            warn!(%room_id, "flow events cleared");
        }
    }
}
