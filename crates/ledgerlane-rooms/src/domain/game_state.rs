//! The typed game-state record carried by every room.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ledgerlane_core::ids::PlayerId;
use ledgerlane_core::metrics::{DecisionEffect, PlayerMetrics};
use ledgerlane_core::outcomes::{AuditOutcome, SettlementFigures};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The first game year.
pub const FIRST_YEAR: u32 = 1;

/// The last game year; reaching it ends the game.
pub const FINAL_YEAR: u32 = 20;

/// A decision submitted by a player for the cell they landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub year: u32,
    pub grid_position: u32,
    pub grid_type: String,
    pub choice: String,
}

/// A decision appended to the room's decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub player_id: PlayerId,
    /// Display name at write time, kept readable after the player leaves.
    pub player_name: Option<String>,
    #[serde(flatten)]
    pub decision: Decision,
    pub effects: DecisionEffect,
    pub recorded_at: DateTime<Utc>,
}

/// An audit appended to the room's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    #[serde(flatten)]
    pub outcome: AuditOutcome,
    pub recorded_at: DateTime<Utc>,
}

/// A settlement appended to the room's settlement log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    #[serde(flatten)]
    pub figures: SettlementFigures,
    pub recorded_at: DateTime<Utc>,
}

/// Server-authoritative state of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current game year, `FIRST_YEAR..=FINAL_YEAR`.
    pub current_year: u32,
    /// Turns taken in the current year.
    pub turn_count: u64,
    /// Per-player metrics mirror.
    pub players: BTreeMap<PlayerId, PlayerMetrics>,
    /// Append-only decision log.
    pub decisions: Vec<DecisionRecord>,
    /// Append-only audit log.
    pub audits: Vec<AuditRecord>,
    /// Append-only settlement log.
    pub settlements: Vec<SettlementRecord>,
    /// Open-ended data the typed fields do not cover.
    pub extra: Map<String, Value>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_year: FIRST_YEAR,
            turn_count: 0,
            players: BTreeMap::new(),
            decisions: Vec::new(),
            audits: Vec::new(),
            settlements: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl GameState {
    /// Merges `patch` into this state. `extra` keys are merged one level deep.
    pub fn merge(&mut self, patch: &GameStatePatch) {
        if let Some(year) = patch.current_year {
            self.current_year = year;
        }
        if let Some(turn_count) = patch.turn_count {
            self.turn_count = turn_count;
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Metrics for `player_id`, if the mirror holds any.
    #[must_use]
    pub fn metrics(&self, player_id: &PlayerId) -> Option<&PlayerMetrics> {
        self.players.get(player_id)
    }
}

/// A shallow update to [`GameState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStatePatch {
    pub current_year: Option<u32>,
    pub turn_count: Option<u64>,
    pub extra: Map<String, Value>,
}
