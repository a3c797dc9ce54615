//! Timing knobs for turn coordination.

use std::time::Duration;

/// How long a player may hold the turn before it is forfeited.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(300);

/// Minimum spacing between two recorded actions in one room.
pub const DEFAULT_ACTION_COOLDOWN: Duration = Duration::from_millis(500);

/// Turn timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnConfig {
    pub turn_timeout: Duration,
    pub action_cooldown: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            action_cooldown: DEFAULT_ACTION_COOLDOWN,
        }
    }
}

impl TurnConfig {
    pub(crate) fn timeout_millis(&self) -> u64 {
        u64::try_from(self.turn_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub(crate) fn cooldown_millis(&self) -> u64 {
        u64::try_from(self.action_cooldown.as_millis()).unwrap_or(u64::MAX)
    }
}
