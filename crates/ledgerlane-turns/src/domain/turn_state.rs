//! Per-room turn state.

use chrono::{DateTime, Utc};
use ledgerlane_core::bounded::BoundedLog;
use ledgerlane_core::ids::{PlayerId, RoomId};
use serde::Serialize;
use serde_json::Value;

/// Maximum number of actions kept for a single turn.
pub const TURN_ACTION_CAPACITY: usize = 64;

/// Kind of an action taken during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    RollDice,
    MakeDecision,
    AnnualSettle,
    SkipTurn,
}

/// One action taken during a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnAction {
    pub player_id: PlayerId,
    pub kind: ActionKind,
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
}

/// Where the active player stands within their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingRoll,
    AwaitingDecision,
    ReadyForSettlementOrNext,
}

/// The state of the current turn in one room.
///
/// Never edited across transitions: advancing or skipping allocates a fresh
/// value with both gates cleared.
#[derive(Debug, Clone, Serialize)]
pub struct TurnState {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub dice_rolled: bool,
    pub decision_made: bool,
    pub turn_started_at: DateTime<Utc>,
    pub actions: BoundedLog<TurnAction>,
}

impl TurnState {
    /// A fresh turn for `player_id` with both gates cleared.
    #[must_use]
    pub fn new(room_id: RoomId, player_id: PlayerId, started_at: DateTime<Utc>) -> Self {
        Self {
            room_id,
            player_id,
            dice_rolled: false,
            decision_made: false,
            turn_started_at: started_at,
            actions: BoundedLog::with_capacity(TURN_ACTION_CAPACITY),
        }
    }

    /// A turn is complete once both gates are set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dice_rolled && self.decision_made
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        match (self.dice_rolled, self.decision_made) {
            (false, _) => TurnPhase::AwaitingRoll,
            (true, false) => TurnPhase::AwaitingDecision,
            (true, true) => TurnPhase::ReadyForSettlementOrNext,
        }
    }

    pub(crate) fn record(
        &mut self,
        player_id: PlayerId,
        kind: ActionKind,
        payload: Value,
        occurred_at: DateTime<Utc>,
    ) {
        match kind {
            ActionKind::RollDice => self.dice_rolled = true,
            ActionKind::MakeDecision => self.decision_made = true,
            ActionKind::AnnualSettle | ActionKind::SkipTurn => {}
        }
        self.actions.push(TurnAction {
            player_id,
            kind,
            payload,
            occurred_at,
        });
    }
}
