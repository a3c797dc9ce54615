//! Flow events.

use chrono::{DateTime, Utc};
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::metrics::DecisionEffect;
use ledgerlane_core::outcomes::{AuditOutcome, SettlementFigures};
use ledgerlane_rooms::domain::game_state::Decision;
use serde::Serialize;

use super::stats::GameStats;

/// Payload of a flow event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEventKind {
    DecisionMade {
        decision: Decision,
        effects: DecisionEffect,
    },
    AuditTriggered(AuditOutcome),
    SettlementCompleted(SettlementFigures),
    YearAdvanced {
        new_year: u32,
    },
    GameEnded(GameStats),
}

impl FlowEventKind {
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DecisionMade { .. } => "decision_made",
            Self::AuditTriggered(_) => "audit_triggered",
            Self::SettlementCompleted(_) => "settlement_completed",
            Self::YearAdvanced { .. } => "year_advanced",
            Self::GameEnded(_) => "game_ended",
        }
    }
}

/// A significant game occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFlowEvent {
    pub room_id: RoomId,
    /// Absent for room-wide events.
    pub player_id: Option<PlayerId>,
    #[serde(flatten)]
    pub kind: FlowEventKind,
    pub occurred_at: DateTime<Utc>,
}
