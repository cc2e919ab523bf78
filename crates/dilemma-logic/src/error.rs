//! Error types for configuration and round resolution

use thiserror::Error;

/// A rejected game configuration. Nothing is set up when one is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the game must have between {min} and {max} players, got {got}")]
    PlayerCount { got: usize, min: usize, max: usize },

    #[error("a repeated game must have between {min} and {max} rounds, got {got}")]
    RoundCount { got: u32, min: u32, max: u32 },

    #[error("{got} player entries configured for a {expected}-player game")]
    PlayerEntries { got: usize, expected: usize },

    #[error("unknown strategy `{0}`")]
    UnknownStrategy(String),

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Errors surfaced by the round engine and the game session
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Out-of-range configuration, detected before any round starts.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Players at these seats have no decision. The round was not scored.
    #[error("all players must make a decision (missing seats: {seats:?})")]
    IncompleteDecision { seats: Vec<usize> },

    /// Caller logic defect, such as resolving a manual player or a decision
    /// vector that does not match the seated players.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("the game is over, start a new game")]
    GameOver,

    #[error("the game is not finished ({remaining} rounds remaining)")]
    NotFinished { remaining: u32 },

    #[error("rounds cannot be skipped while a manual player is seated")]
    ManualPlayersPresent,
}

impl GameError {
    /// Stable identifier of the error kind, for front-ends that map errors
    /// to their own notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::Configuration(_) => "configuration",
            GameError::IncompleteDecision { .. } => "incomplete-decision",
            GameError::ContractViolation(_) => "contract-violation",
            GameError::GameOver => "game-over",
            GameError::NotFinished { .. } => "not-finished",
            GameError::ManualPlayersPresent => "manual-players-present",
        }
    }
}
