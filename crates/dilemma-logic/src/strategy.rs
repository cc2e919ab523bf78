//! Decisions, strategies and the strategy resolver

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GameError};
use crate::game::{Player, RoundResult};

/// A decision in one round
///
/// Serialized as `"C"`, `"D"`, or `null` while still unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Decision {
    /// Don't confess.
    Cooperate,
    /// Confess.
    Defect,
    /// No decision yet. Never survives round resolution.
    #[default]
    Unset,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
enum Mark {
    C,
    D,
}

impl From<Option<Mark>> for Decision {
    fn from(mark: Option<Mark>) -> Self {
        match mark {
            Some(Mark::C) => Decision::Cooperate,
            Some(Mark::D) => Decision::Defect,
            None => Decision::Unset,
        }
    }
}

impl From<Decision> for Option<Mark> {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Cooperate => Some(Mark::C),
            Decision::Defect => Some(Mark::D),
            Decision::Unset => None,
        }
    }
}

impl Decision {
    pub fn is_set(self) -> bool {
        self != Decision::Unset
    }

    /// Human-readable label in the game's confession framing
    pub fn label(self) -> &'static str {
        match self {
            Decision::Cooperate => "Didn't confess",
            Decision::Defect => "Confessed",
            Decision::Unset => "Undecided",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Cooperate => write!(f, "C"),
            Decision::Defect => write!(f, "D"),
            Decision::Unset => write!(f, "-"),
        }
    }
}

/// Decision policy assigned to a seat
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Decisions come from a human, never from the resolver.
    #[default]
    Manual,
    /// Never confess.
    AlwaysCooperate,
    /// Always confess.
    AlwaysDefect,
    /// Follow the majority of the previous round. Start by cooperating.
    TitForTat,
    /// Fair coin flip every round.
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Manual,
        Strategy::AlwaysCooperate,
        Strategy::AlwaysDefect,
        Strategy::TitForTat,
        Strategy::Random,
    ];

    /// Identifier used in configuration files and on the command line
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Manual => "manual",
            Strategy::AlwaysCooperate => "always-cooperate",
            Strategy::AlwaysDefect => "always-defect",
            Strategy::TitForTat => "tit-for-tat",
            Strategy::Random => "random",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Manual => "Manual",
            Strategy::AlwaysCooperate => "Never Confess",
            Strategy::AlwaysDefect => "Always Confess",
            Strategy::TitForTat => "Tit for Tat",
            Strategy::Random => "Random",
        }
    }

    pub fn is_manual(self) -> bool {
        self == Strategy::Manual
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownStrategy(wanted.to_string()))
    }
}

/// Human-readable description of a strategy
pub fn describe_strategy(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Manual => "Decides by hand every round.",
        Strategy::AlwaysCooperate => "Never confesses.",
        Strategy::AlwaysDefect => "Always confesses.",
        Strategy::TitForTat => {
            "Does what most players did last round. Starts by not confessing."
        }
        Strategy::Random => "Confesses or not at random each round.",
    }
}

/// Produce a decision for a strategy-driven player
///
/// # Arguments
/// * `player` - The seat to decide for; must not be manual
/// * `round` - Round being played (1-indexed)
/// * `history` - Every round recorded so far, oldest first
/// * `rng` - Random source for the Random strategy
pub fn resolve<R: Rng + ?Sized>(
    player: &Player,
    round: u32,
    history: &[RoundResult],
    rng: &mut R,
) -> Result<Decision, GameError> {
    let decision = match player.strategy {
        Strategy::Manual => {
            return Err(GameError::ContractViolation(format!(
                "player {} ({}) is manual and has no strategy to resolve",
                player.id, player.name
            )));
        }
        Strategy::AlwaysCooperate => Decision::Cooperate,
        Strategy::AlwaysDefect => Decision::Defect,
        Strategy::TitForTat => resolve_tit_for_tat(round, history),
        Strategy::Random => resolve_random(rng),
    };

    log::debug!(
        "round {}: {} ({}) resolved to {}",
        round,
        player.name,
        player.strategy,
        decision
    );
    Ok(decision)
}

/// Tit-for-Tat: follow the majority of the previous round
fn resolve_tit_for_tat(round: u32, history: &[RoundResult]) -> Decision {
    if round == 1 {
        return Decision::Cooperate;
    }
    match history.last() {
        None => Decision::Cooperate,
        Some(last) => {
            // Strictly more than half; an even split counts as defection
            if 2 * last.cooperators() > last.decisions.len() {
                Decision::Cooperate
            } else {
                Decision::Defect
            }
        }
    }
}

/// Random: fair coin, independent every round
fn resolve_random<R: Rng + ?Sized>(rng: &mut R) -> Decision {
    if rng.random_bool(0.5) {
        Decision::Cooperate
    } else {
        Decision::Defect
    }
}
