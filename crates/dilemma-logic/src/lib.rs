//! Game logic for the multi-player Prisoner's Dilemma simulator
//!
//! Core rules for a "confess / don't confess" game with 2-5 players.
//! This crate is compiled to:
//! - Native (for the terminal front-end)
//! - WASM (for a browser front-end)

mod analysis;
mod config;
mod error;
mod game;
mod random;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use analysis::{classify, cooperation_rate, standings, CooperationRate, Equilibrium, GameReport, Standing};
pub use config::{GameConfig, GameMode, PlayerConfig, MAX_PLAYERS, MAX_ROUNDS, MIN_PLAYERS, MIN_ROUNDS};
pub use error::{ConfigError, GameError};
pub use game::{resolve_round, Phase, Player, RoundOutcome, RoundResult, Session};
pub use random::SeededRng;
pub use strategy::{describe_strategy, resolve, Decision, Strategy};

/// Penalty matrix for the group Prisoner's Dilemma
///
/// Returns `(cooperator_penalty, defector_penalty)` for a round with `total`
/// players of whom `cooperators` did not confess. Penalties are years, lower
/// is better. Two players follow the classical matrix; larger groups use
/// their own table. A `cooperators` count above `total` is treated as
/// everyone cooperating.
pub fn payoff(total: usize, cooperators: usize) -> (u32, u32) {
    let cooperators = cooperators.min(total);
    let defectors = total - cooperators;
    if total == 2 {
        match cooperators {
            2 => (2, 2),
            1 => (10, 0),
            _ => (5, 5),
        }
    } else {
        match defectors {
            0 => (2, 2),
            d if d == total => (5, 5),
            1 => (6, 0),
            _ => (8, 2),
        }
    }
}

/// Compute every player's penalty for one round
///
/// The result is aligned by index with `decisions`. Fails if any decision is
/// still `Unset` or if fewer than two decisions are given.
pub fn compute_penalties(decisions: &[Decision]) -> Result<Vec<u32>, GameError> {
    if decisions.len() < MIN_PLAYERS {
        return Err(GameError::ContractViolation(format!(
            "a round needs at least {} decisions, got {}",
            MIN_PLAYERS,
            decisions.len()
        )));
    }

    let mut cooperators = 0;
    let mut seats = Vec::new();
    for (seat, decision) in decisions.iter().enumerate() {
        match decision {
            Decision::Cooperate => cooperators += 1,
            Decision::Defect => {}
            Decision::Unset => seats.push(seat),
        }
    }
    if !seats.is_empty() {
        return Err(GameError::IncompleteDecision { seats });
    }

    let (cooperator, defector) = payoff(decisions.len(), cooperators);
    Ok(decisions
        .iter()
        .map(|d| match d {
            Decision::Cooperate => cooperator,
            _ => defector,
        })
        .collect())
}
