//! Game configuration and its validation

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::strategy::Strategy;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;
/// Round bounds apply to repeated games only
pub const MIN_ROUNDS: u32 = 5;
pub const MAX_ROUNDS: u32 = 50;

/// One round, or a fixed number of repeated rounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Single,
    Repeated,
}

/// Per-seat settings. Both fields fall back to defaults when omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: Option<String>,
    pub strategy: Strategy,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self { name: Some(name.into()), strategy }
    }
}

/// Everything needed to start a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: GameMode,
    pub player_count: usize,
    /// Ignored in single-round mode
    pub round_count: u32,
    /// Seat settings in seat order; may be shorter than `player_count`
    pub players: Vec<PlayerConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Single,
            player_count: 2,
            round_count: 10,
            players: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Single-round game
    pub fn single(player_count: usize) -> Self {
        Self { player_count, ..Default::default() }
    }

    /// Repeated game over `round_count` rounds
    pub fn repeated(player_count: usize, round_count: u32) -> Self {
        Self {
            mode: GameMode::Repeated,
            player_count,
            round_count,
            ..Default::default()
        }
    }

    /// Append the next seat
    pub fn with_player(mut self, name: impl Into<String>, strategy: Strategy) -> Self {
        self.players.push(PlayerConfig::new(name, strategy));
        self
    }

    /// Parse a JSON configuration. Does not validate ranges.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Reject out-of-range settings. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                got: self.player_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        if self.mode == GameMode::Repeated && !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.round_count) {
            return Err(ConfigError::RoundCount {
                got: self.round_count,
                min: MIN_ROUNDS,
                max: MAX_ROUNDS,
            });
        }

        if self.players.len() > self.player_count {
            return Err(ConfigError::PlayerEntries {
                got: self.players.len(),
                expected: self.player_count,
            });
        }

        Ok(())
    }

    /// Rounds a game with this configuration lasts
    pub fn total_rounds(&self) -> u32 {
        match self.mode {
            GameMode::Single => 1,
            GameMode::Repeated => self.round_count,
        }
    }

    /// Display name for a seat; blank or missing names become `Player N`
    pub fn player_name(&self, seat: usize) -> String {
        self.players
            .get(seat)
            .and_then(|p| p.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Player {}", seat + 1))
    }

    pub fn player_strategy(&self, seat: usize) -> Strategy {
        self.players.get(seat).map(|p| p.strategy).unwrap_or_default()
    }
}
