//! The turn coordinator.
//!
//! One [`TurnState`] per room, replaced wholesale on every transition. Each
//! allocation arms a timeout; the timer carries a generation number so a
//! firing that raced with a transition is recognised as stale and ignored.
//!
//! The coordinator also owns the per-room locks that serialize every
//! mutation on a room. Callers take [`TurnCoordinator::room_lock`] before
//! calling in; the timeout path takes it itself.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use ledgerlane_core::bounded::BoundedLog;
use ledgerlane_core::clock::Clock;
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::timer::{TimeoutHandle, TimeoutScheduler};
use ledgerlane_rooms::RoomRegistry;
use ledgerlane_rooms::domain::room::RoomStatus;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::domain::config::TurnConfig;
use crate::domain::turn_state::{ActionKind, TurnAction, TurnState};

/// Maximum number of finished turns archived per room.
pub const TURN_HISTORY_CAPACITY: usize = 100;

struct ArmedTimer {
    generation: u64,
    armed_at: DateTime<Utc>,
    handle: Box<dyn TimeoutHandle>,
}

#[derive(Default)]
struct CoordinatorInner {
    turns: HashMap<RoomId, TurnState>,
    timers: HashMap<RoomId, ArmedTimer>,
    last_action_at: HashMap<RoomId, DateTime<Utc>>,
    history: HashMap<RoomId, BoundedLog<TurnState>>,
    next_generation: u64,
}

/// Coordinates turns for every room in the registry.
pub struct TurnCoordinator {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn TimeoutScheduler>,
    config: TurnConfig,
    inner: Mutex<CoordinatorInner>,
    room_locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
    this: Weak<TurnCoordinator>,
}

impl std::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TurnCoordinator {
    /// Creates a coordinator. Returned behind an `Arc` because armed timers
    /// call back into it.
    #[must_use]
    pub fn new(
        registry: Arc<RoomRegistry>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TimeoutScheduler>,
        config: TurnConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            registry,
            clock,
            scheduler,
            config,
            inner: Mutex::new(CoordinatorInner::default()),
            room_locks: Mutex::new(HashMap::new()),
            this: this.clone(),
        })
    }

    #[must_use]
    pub fn config(&self) -> TurnConfig {
        self.config
    }

    /// The lock serializing mutations on `room_id`. Not re-entrant: never
    /// take it twice on one thread.
    #[must_use]
    pub fn room_lock(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        Arc::clone(self.room_locks.lock().entry(room_id).or_default())
    }

    /// Forgets the lock of a deleted room.
    pub fn release_room_lock(&self, room_id: RoomId) {
        self.room_locks.lock().remove(&room_id);
    }

    /// Allocates a fresh turn for whoever holds the turn in the registry and
    /// arms its timeout. Replaces any existing turn state for the room.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist.
    pub fn initialize_turn_state(&self, room_id: RoomId) -> Result<TurnState, GameError> {
        let mut inner = self.inner.lock();
        let player_id = self.registry.with_room(room_id, |r| r.current_turn.clone())?;
        Self::disarm(&mut inner, room_id);
        let state = TurnState::new(room_id, player_id.clone(), self.clock.now());
        inner.turns.insert(room_id, state.clone());
        self.arm(&mut inner, room_id);
        info!(%room_id, %player_id, "turn state initialized");
        Ok(state)
    }

    #[must_use]
    pub fn turn_state(&self, room_id: RoomId) -> Option<TurnState> {
        self.inner.lock().turns.get(&room_id).cloned()
    }

    /// Actions taken in the current turn, oldest first.
    #[must_use]
    pub fn turn_actions(&self, room_id: RoomId) -> Vec<TurnAction> {
        self.inner
            .lock()
            .turns
            .get(&room_id)
            .map(|t| t.actions.to_vec())
            .unwrap_or_default()
    }

    /// Milliseconds left before the current turn is forfeited.
    #[must_use]
    pub fn turn_remaining(&self, room_id: RoomId) -> Option<u64> {
        let inner = self.inner.lock();
        let timer = inner.timers.get(&room_id)?;
        let elapsed = self.clock.millis_since(timer.armed_at);
        Some(self.config.timeout_millis().saturating_sub(elapsed))
    }

    /// Finished turns of the room, oldest first.
    #[must_use]
    pub fn turn_history(&self, room_id: RoomId) -> Vec<TurnState> {
        self.inner
            .lock()
            .history
            .get(&room_id)
            .map(BoundedLog::to_vec)
            .unwrap_or_default()
    }

    /// Checks that `player_id` may roll now.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, `GameError::PermissionDenied` when
    /// it is not the player's turn, `GameError::TurnNotInitialized`, or
    /// `GameError::SequenceViolation` when the dice were already rolled.
    pub fn can_roll_dice(&self, room_id: RoomId, player_id: &PlayerId) -> Result<(), GameError> {
        let inner = self.inner.lock();
        self.check_roll(&inner, room_id, player_id)
    }

    /// Sets the dice gate and logs a `roll_dice` action.
    ///
    /// # Errors
    ///
    /// Fails exactly when [`Self::can_roll_dice`] would.
    pub fn record_dice_roll(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        dice: u32,
    ) -> Result<(), GameError> {
        let mut inner = self.inner.lock();
        self.check_roll(&inner, room_id, player_id)?;
        self.record(&mut inner, room_id, player_id, ActionKind::RollDice, json!({ "dice": dice }))?;
        debug!(%room_id, %player_id, dice, "dice roll recorded");
        Ok(())
    }

    /// Checks that `player_id` may submit a decision now.
    ///
    /// # Errors
    ///
    /// As [`Self::can_roll_dice`], plus `GameError::SequenceViolation` before
    /// the roll or after a decision was already made.
    pub fn can_make_decision(&self, room_id: RoomId, player_id: &PlayerId) -> Result<(), GameError> {
        let inner = self.inner.lock();
        self.check_decision(&inner, room_id, player_id)
    }

    /// Sets the decision gate and logs a `make_decision` action.
    ///
    /// # Errors
    ///
    /// Fails exactly when [`Self::can_make_decision`] would.
    pub fn record_decision(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        decision: Value,
    ) -> Result<(), GameError> {
        let mut inner = self.inner.lock();
        self.check_decision(&inner, room_id, player_id)?;
        self.record(&mut inner, room_id, player_id, ActionKind::MakeDecision, decision)?;
        debug!(%room_id, %player_id, "decision recorded");
        Ok(())
    }

    /// Checks that every member other than `player_id` has settled this year.
    /// Not restricted to the turn holder.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, `GameError::TurnNotInitialized`,
    /// `GameError::PlayerNotFound` for a non-member, or
    /// `GameError::PermissionDenied` naming who is pending.
    pub fn can_annual_settle(&self, room_id: RoomId, player_id: &PlayerId) -> Result<(), GameError> {
        let inner = self.inner.lock();
        if !inner.turns.contains_key(&room_id) {
            self.registry.with_room(room_id, |_| ())?;
            return Err(GameError::TurnNotInitialized(room_id));
        }
        let pending = self.registry.with_room(room_id, |room| {
            if !room.is_member(player_id) {
                return Err(GameError::PlayerNotFound(player_id.clone()));
            }
            Ok(room
                .members
                .iter()
                .filter(|m| &m.player_id != player_id)
                .filter(|m| {
                    !room
                        .game_state
                        .metrics(&m.player_id)
                        .is_some_and(|metrics| metrics.settled_this_year)
                })
                .map(|m| m.player_id.to_string())
                .collect::<Vec<_>>())
        })??;

        if pending.is_empty() {
            Ok(())
        } else {
            Err(GameError::PermissionDenied(format!(
                "waiting for other players to settle: {}",
                pending.join(", ")
            )))
        }
    }

    /// Logs an `annual_settle` action in the current turn.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TurnNotInitialized` if the room has no turn state.
    pub fn record_settlement(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
        settlement: Value,
    ) -> Result<(), GameError> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, room_id, player_id, ActionKind::AnnualSettle, settlement)
    }

    /// Rejects an action arriving within the cooldown of the room's last one.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RateLimited` carrying the remaining wait.
    pub fn validate_action_frequency(
        &self,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<(), GameError> {
        let inner = self.inner.lock();
        let Some(&last) = inner.last_action_at.get(&room_id) else {
            return Ok(());
        };
        let elapsed = self.clock.millis_since(last);
        let cooldown = self.config.cooldown_millis();
        if elapsed < cooldown {
            let remaining_ms = cooldown - elapsed;
            warn!(%room_id, %player_id, remaining_ms, "action rate limited");
            return Err(GameError::RateLimited { remaining_ms });
        }
        Ok(())
    }

    /// Ends a completed turn and hands it to the next member.
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound`, `GameError::PermissionDenied` when
    /// the caller does not hold the turn, `GameError::TurnNotInitialized`, or
    /// `GameError::SequenceViolation` when either gate is still open.
    pub fn next_turn(&self, room_id: RoomId, player_id: &PlayerId) -> Result<PlayerId, GameError> {
        let mut inner = self.inner.lock();
        self.ensure_turn_holder(room_id, player_id)?;
        let state = inner
            .turns
            .get(&room_id)
            .ok_or(GameError::TurnNotInitialized(room_id))?;
        if !state.is_complete() {
            return Err(GameError::SequenceViolation(
                "roll the dice and make a decision before ending the turn".to_owned(),
            ));
        }

        let next = self.transition(&mut inner, room_id, None)?;
        info!(%room_id, from = %player_id, to = %next, "turn advanced");
        Ok(next)
    }

    /// Forfeits the current turn without any turn or gate checks. The caller
    /// must hold the room's [`Self::room_lock`].
    ///
    /// # Errors
    ///
    /// Returns `GameError::RoomNotFound` if the room does not exist and
    /// `GameError::SequenceViolation` unless the game is being played.
    pub fn skip_turn(&self, room_id: RoomId) -> Result<PlayerId, GameError> {
        let mut inner = self.inner.lock();
        self.skip_locked(&mut inner, room_id)
    }

    /// Disarms the timer and drops every trace of the room.
    pub fn clear_room(&self, room_id: RoomId) {
        let mut inner = self.inner.lock();
        Self::disarm(&mut inner, room_id);
        inner.turns.remove(&room_id);
        inner.last_action_at.remove(&room_id);
        inner.history.remove(&room_id);
        debug!(%room_id, "turn data cleared");
    }

    fn ensure_turn_holder(&self, room_id: RoomId, player_id: &PlayerId) -> Result<(), GameError> {
        let holder = self.registry.with_room(room_id, |r| r.current_turn.clone())?;
        if &holder == player_id {
            Ok(())
        } else {
            Err(GameError::PermissionDenied(format!(
                "it is {holder}'s turn, not {player_id}'s"
            )))
        }
    }

    fn current<'a>(
        &self,
        inner: &'a CoordinatorInner,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<&'a TurnState, GameError> {
        self.ensure_turn_holder(room_id, player_id)?;
        inner
            .turns
            .get(&room_id)
            .ok_or(GameError::TurnNotInitialized(room_id))
    }

    fn check_roll(
        &self,
        inner: &CoordinatorInner,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<(), GameError> {
        let state = self.current(inner, room_id, player_id)?;
        if state.dice_rolled {
            return Err(GameError::SequenceViolation(
                "dice already rolled this turn".to_owned(),
            ));
        }
        Ok(())
    }

    fn check_decision(
        &self,
        inner: &CoordinatorInner,
        room_id: RoomId,
        player_id: &PlayerId,
    ) -> Result<(), GameError> {
        let state = self.current(inner, room_id, player_id)?;
        if !state.dice_rolled {
            return Err(GameError::SequenceViolation(
                "roll the dice before making a decision".to_owned(),
            ));
        }
        if state.decision_made {
            return Err(GameError::SequenceViolation(
                "decision already made this turn".to_owned(),
            ));
        }
        Ok(())
    }

    fn record(
        &self,
        inner: &mut CoordinatorInner,
        room_id: RoomId,
        player_id: &PlayerId,
        kind: ActionKind,
        payload: Value,
    ) -> Result<(), GameError> {
        let now = self.clock.now();
        let state = inner
            .turns
            .get_mut(&room_id)
            .ok_or(GameError::TurnNotInitialized(room_id))?;
        state.record(player_id.clone(), kind, payload, now);
        inner.last_action_at.insert(room_id, now);
        Ok(())
    }

    fn skip_locked(&self, inner: &mut CoordinatorInner, room_id: RoomId) -> Result<PlayerId, GameError> {
        let (forfeiter, status) = self
            .registry
            .with_room(room_id, |r| (r.current_turn.clone(), r.status))?;
        if status != RoomStatus::Playing {
            return Err(GameError::SequenceViolation(
                "turns can only be skipped while the game is being played".to_owned(),
            ));
        }
        let now = self.clock.now();
        let forfeit = TurnAction {
            player_id: forfeiter.clone(),
            kind: ActionKind::SkipTurn,
            payload: Value::Null,
            occurred_at: now,
        };
        let next = self.transition(inner, room_id, Some(forfeit))?;
        warn!(%room_id, %forfeiter, to = %next, "turn skipped");
        Ok(next)
    }

    /// Disarms the running timer, archives the finished turn, rotates in the
    /// registry and arms a fresh turn.
    fn transition(
        &self,
        inner: &mut CoordinatorInner,
        room_id: RoomId,
        forfeit: Option<TurnAction>,
    ) -> Result<PlayerId, GameError> {
        Self::disarm(inner, room_id);

        let finished = inner.turns.remove(&room_id);
        let finished = match (finished, forfeit) {
            (Some(mut state), Some(action)) => {
                state.record(action.player_id, action.kind, action.payload, action.occurred_at);
                Some(state)
            }
            (None, Some(action)) => {
                let mut state = TurnState::new(room_id, action.player_id.clone(), action.occurred_at);
                state.record(action.player_id, action.kind, action.payload, action.occurred_at);
                Some(state)
            }
            (state, None) => state,
        };
        if let Some(state) = finished {
            inner
                .history
                .entry(room_id)
                .or_insert_with(|| BoundedLog::with_capacity(TURN_HISTORY_CAPACITY))
                .push(state);
        }

        let next = self.registry.next_turn(room_id)?;
        inner
            .turns
            .insert(room_id, TurnState::new(room_id, next.clone(), self.clock.now()));
        self.arm(inner, room_id);
        Ok(next)
    }

    fn arm(&self, inner: &mut CoordinatorInner, room_id: RoomId) {
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let coordinator = self.this.clone();
        let handle = self.scheduler.schedule(
            self.config.turn_timeout,
            Box::new(move || {
                if let Some(coordinator) = coordinator.upgrade() {
                    coordinator.handle_timeout(room_id, generation);
                }
            }),
        );
        inner.timers.insert(
            room_id,
            ArmedTimer {
                generation,
                armed_at: self.clock.now(),
                handle,
            },
        );
    }

    fn disarm(inner: &mut CoordinatorInner, room_id: RoomId) {
        if let Some(timer) = inner.timers.remove(&room_id) {
            timer.handle.cancel();
        }
    }

    fn handle_timeout(&self, room_id: RoomId, generation: u64) {
        let guard = self.room_lock(room_id);
        let _held = guard.lock();
        let mut inner = self.inner.lock();
        let current = inner.timers.get(&room_id).map(|t| t.generation);
        if current != Some(generation) {
            debug!(%room_id, generation, "stale turn timeout ignored");
            return;
        }
        inner.timers.remove(&room_id);
        warn!(%room_id, "turn timed out");
        if let Err(error) = self.skip_locked(&mut inner, room_id) {
            warn!(%room_id, %error, "automatic skip failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use ledgerlane_core::metrics::PlayerMetrics;
    use ledgerlane_rooms::domain::commands::{CreateRoom, JoinRoom};
    use ledgerlane_test_support::{ManualClock, ManualScheduler};

    struct Fixture {
        registry: Arc<RoomRegistry>,
        clock: Arc<ManualClock>,
        scheduler: ManualScheduler,
        coordinator: Arc<TurnCoordinator>,
        room_id: RoomId,
    }

    fn player(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    /// A started four-player room (h, p2, p3, p4) with its turn initialized.
    fn started_room() -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let registry = Arc::new(RoomRegistry::new(clock.clone()));
        let scheduler = ManualScheduler::new();
        let coordinator = TurnCoordinator::new(
            Arc::clone(&registry),
            clock.clone(),
            Arc::new(scheduler.clone()),
            TurnConfig::default(),
        );
        let room = registry.create_room(&CreateRoom::new("h", "Table")).unwrap();
        for id in ["p2", "p3", "p4"] {
            registry
                .join_room(&JoinRoom {
                    room_id: room.room_id,
                    player_id: player(id),
                    player_name: id.to_owned(),
                })
                .unwrap();
        }
        registry.start_game(room.room_id, &player("h")).unwrap();
        coordinator.initialize_turn_state(room.room_id).unwrap();
        Fixture {
            registry,
            clock,
            scheduler,
            coordinator,
            room_id: room.room_id,
        }
    }

    fn mark_settled(fixture: &Fixture, ids: &[&str]) {
        fixture
            .registry
            .with_room_mut(fixture.room_id, |room| {
                for id in ids {
                    room.game_state.players.insert(
                        player(id),
                        PlayerMetrics {
                            settled_this_year: true,
                            ..PlayerMetrics::default()
                        },
                    );
                }
            })
            .unwrap();
    }

    fn complete_turn(fixture: &Fixture, id: &str) {
        fixture
            .coordinator
            .record_dice_roll(fixture.room_id, &player(id), 3)
            .unwrap();
        fixture
            .coordinator
            .record_decision(fixture.room_id, &player(id), json!({ "choice": "A" }))
            .unwrap();
    }

    #[test]
    fn test_decision_before_roll_is_sequence_violation() {
        // Arrange
        let f = started_room();

        // Act
        let before = f.coordinator.can_make_decision(f.room_id, &player("h"));
        f.coordinator.record_dice_roll(f.room_id, &player("h"), 5).unwrap();
        let after = f.coordinator.can_make_decision(f.room_id, &player("h"));

        // Assert
        assert!(matches!(before, Err(GameError::SequenceViolation(_))));
        assert!(after.is_ok());
    }

    #[test]
    fn test_only_turn_holder_may_roll() {
        let f = started_room();

        let err = f.coordinator.can_roll_dice(f.room_id, &player("p2")).unwrap_err();

        assert!(matches!(err, GameError::PermissionDenied(_)));
    }

    #[test]
    fn test_second_roll_is_rejected() {
        let f = started_room();
        f.coordinator.record_dice_roll(f.room_id, &player("h"), 2).unwrap();

        let err = f.coordinator.record_dice_roll(f.room_id, &player("h"), 6).unwrap_err();

        assert!(matches!(err, GameError::SequenceViolation(_)));
    }

    #[test]
    fn test_uninitialized_turn_is_reported() {
        let f = started_room();
        f.coordinator.clear_room(f.room_id);

        let err = f.coordinator.can_roll_dice(f.room_id, &player("h")).unwrap_err();

        assert_eq!(err, GameError::TurnNotInitialized(f.room_id));
    }

    #[test]
    fn test_next_turn_requires_complete_turn() {
        let f = started_room();
        f.coordinator.record_dice_roll(f.room_id, &player("h"), 1).unwrap();

        let err = f.coordinator.next_turn(f.room_id, &player("h")).unwrap_err();

        assert!(matches!(err, GameError::SequenceViolation(_)));
    }

    #[test]
    fn test_completed_turn_ledger_and_rotation() {
        // Arrange
        let f = started_room();
        complete_turn(&f, "h");

        // Act
        let next = f.coordinator.next_turn(f.room_id, &player("h")).unwrap();

        // Assert
        assert_eq!(next, player("p2"));
        let history = f.coordinator.turn_history(f.room_id);
        let kinds: Vec<ActionKind> = history[0].actions.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::RollDice, ActionKind::MakeDecision]);
        let fresh = f.coordinator.turn_state(f.room_id).unwrap();
        assert_eq!(fresh.player_id, player("p2"));
        assert!(!fresh.dice_rolled && !fresh.decision_made);
        assert!(fresh.actions.is_empty());
    }

    #[test]
    fn test_timeout_skips_idle_turn() {
        // Arrange
        let f = started_room();
        assert_eq!(f.scheduler.armed_delays(), vec![Duration::from_secs(300)]);

        // Act
        let fired = f.scheduler.fire_all();

        // Assert
        assert_eq!(fired, 1);
        assert_eq!(f.registry.get_room(f.room_id).unwrap().current_turn, player("p2"));
        let state = f.coordinator.turn_state(f.room_id).unwrap();
        assert_eq!(state.player_id, player("p2"));
        assert!(!state.dice_rolled && !state.decision_made);
        let forfeited = f.coordinator.turn_history(f.room_id);
        let skip = forfeited[0].actions.last().unwrap();
        assert_eq!(skip.kind, ActionKind::SkipTurn);
        assert_eq!(skip.player_id, player("h"));
        assert_eq!(f.scheduler.armed_count(), 1);
    }

    #[test]
    fn test_transition_disarms_previous_timer() {
        let f = started_room();
        complete_turn(&f, "h");

        f.coordinator.next_turn(f.room_id, &player("h")).unwrap();
        let fired = f.scheduler.fire_all();

        // Only the timer armed for p2 runs; the one armed for h was cancelled.
        assert_eq!(fired, 1);
        assert_eq!(f.registry.get_room(f.room_id).unwrap().current_turn, player("p3"));
    }

    #[test]
    fn test_stale_timeout_is_ignored() {
        let f = started_room();
        let stale_generation = f.coordinator.inner.lock().timers[&f.room_id].generation;
        f.coordinator.skip_turn(f.room_id).unwrap();

        f.coordinator.handle_timeout(f.room_id, stale_generation);

        assert_eq!(f.registry.get_room(f.room_id).unwrap().current_turn, player("p2"));
    }

    #[test]
    fn test_settlement_waits_for_everyone_else() {
        // Arrange
        let f = started_room();
        mark_settled(&f, &["h", "p3"]);

        // Act
        let p2 = f.coordinator.can_annual_settle(f.room_id, &player("p2"));
        mark_settled(&f, &["p2"]);
        let p4 = f.coordinator.can_annual_settle(f.room_id, &player("p4"));

        // Assert
        match p2 {
            Err(GameError::PermissionDenied(message)) => assert!(message.contains("p4")),
            other => panic!("expected permission denied, got {other:?}"),
        }
        assert!(p4.is_ok());
    }

    #[test]
    fn test_cooldown_rejects_then_allows() {
        let f = started_room();
        f.coordinator.record_dice_roll(f.room_id, &player("h"), 4).unwrap();

        f.clock.advance_millis(200);
        let early = f.coordinator.validate_action_frequency(f.room_id, &player("p3"));
        f.clock.advance_millis(300);
        let later = f.coordinator.validate_action_frequency(f.room_id, &player("p3"));

        assert_eq!(early, Err(GameError::RateLimited { remaining_ms: 300 }));
        assert!(later.is_ok());
    }

    #[test]
    fn test_turn_remaining_counts_down() {
        let f = started_room();

        f.clock.advance_millis(60_000);

        assert_eq!(f.coordinator.turn_remaining(f.room_id), Some(240_000));
    }

    #[test]
    fn test_clear_room_disarms_timer() {
        let f = started_room();

        f.coordinator.clear_room(f.room_id);

        assert_eq!(f.scheduler.armed_count(), 0);
        assert!(f.coordinator.turn_state(f.room_id).is_none());
        assert!(f.coordinator.turn_remaining(f.room_id).is_none());
    }

    #[test]
    fn test_skip_rejected_once_game_finished() {
        let f = started_room();
        f.coordinator.clear_room(f.room_id);
        f.registry.end_game(f.room_id).unwrap();

        let err = f.coordinator.skip_turn(f.room_id).unwrap_err();

        assert!(matches!(err, GameError::SequenceViolation(_)));
        assert_eq!(f.registry.get_room(f.room_id).unwrap().current_turn, player("h"));
        assert_eq!(f.scheduler.armed_count(), 0);
    }

    #[test]
    fn test_timeout_waits_for_room_lock() {
        // Arrange
        let f = started_room();
        let lock = f.coordinator.room_lock(f.room_id);
        let held = lock.lock();
        let scheduler = f.scheduler.clone();

        // Act
        let firing = std::thread::spawn(move || scheduler.fire_all());
        std::thread::sleep(Duration::from_millis(50));
        let during = f.registry.get_room(f.room_id).unwrap().current_turn;
        drop(held);
        let fired = firing.join().unwrap();

        // Assert
        assert_eq!(during, player("h"));
        assert_eq!(fired, 1);
        assert_eq!(f.registry.get_room(f.room_id).unwrap().current_turn, player("p2"));
    }
}
