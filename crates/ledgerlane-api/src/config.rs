//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use ledgerlane_rooms::domain::commands::DEFAULT_CAPACITY;
use ledgerlane_turns::domain::config::TurnConfig;

use crate::error::AppError;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub turn_timeout_secs: u64,
    pub action_cooldown_ms: u64,
    /// Capacity used when a create request does not name one.
    pub room_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            turn_timeout_secs: 300,
            action_cooldown_ms: 500,
            room_capacity: DEFAULT_CAPACITY,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid ({raw:?}): {e}"))),
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is present but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// absent keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a value is malformed or the room
    /// capacity is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            turn_timeout_secs: parse_or(&lookup, "TURN_TIMEOUT_SECS", defaults.turn_timeout_secs)?,
            action_cooldown_ms: parse_or(&lookup, "ACTION_COOLDOWN_MS", defaults.action_cooldown_ms)?,
            room_capacity: parse_or(&lookup, "ROOM_CAPACITY", defaults.room_capacity)?,
        };
        if config.room_capacity == 0 {
            return Err(AppError::Config("ROOM_CAPACITY must be at least 1".to_owned()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            turn_timeout: Duration::from_secs(self.turn_timeout_secs),
            action_cooldown: Duration::from_millis(self.action_cooldown_ms),
        }
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable host.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
