//! Post-game analysis
//!
//! The equilibrium check is a one-shot argument on the final round only:
//! it asks whether any single player could have lowered their own penalty
//! by switching, with everyone else held fixed. Only the two unanimous
//! outcomes are classified precisely; anything else is reported as mixed.

use serde::{Deserialize, Serialize};

use crate::game::{Player, RoundResult};
use crate::strategy::Decision;

/// Classification of the final round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Equilibrium {
    /// Everyone confessed. Switching alone only earns a longer sentence.
    NashEquilibrium,
    /// Everyone kept quiet, but any one player would gain by confessing.
    CooperativeUnstable,
    /// Split round. Someone has an incentive to deviate.
    MixedUnstable,
}

impl Equilibrium {
    pub fn is_nash(self) -> bool {
        self == Equilibrium::NashEquilibrium
    }

    pub fn status(self) -> &'static str {
        match self {
            Equilibrium::NashEquilibrium => "Nash equilibrium reached",
            Equilibrium::CooperativeUnstable => "Cooperative behavior (not a Nash equilibrium)",
            Equilibrium::MixedUnstable => "Mixed behavior (not a Nash equilibrium)",
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Equilibrium::NashEquilibrium => {
                "When everyone confesses, no player can improve their outcome by changing \
                 their decision alone. A player who switches to not confessing receives a \
                 worse penalty."
            }
            Equilibrium::CooperativeUnstable => {
                "Although everyone cooperated, any player could improve their outcome by \
                 confessing. This situation is therefore unstable."
            }
            Equilibrium::MixedUnstable => {
                "Players have incentives to change their strategies. No point has been \
                 reached where nobody wants to deviate alone."
            }
        }
    }
}

/// Classify the final round of a game
pub fn classify(final_round: &RoundResult) -> Equilibrium {
    if final_round.unanimous(Decision::Defect) {
        Equilibrium::NashEquilibrium
    } else if final_round.unanimous(Decision::Cooperate) {
        Equilibrium::CooperativeUnstable
    } else {
        Equilibrium::MixedUnstable
    }
}

/// A line of the final ranking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1 is best
    pub position: usize,
    pub player_id: usize,
    pub name: String,
    pub total_penalty: u32,
}

/// Rank players by total penalty, lowest first. Ties keep seat order.
pub fn standings(players: &[Player]) -> Vec<Standing> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by_key(|p| p.total_penalty());
    ranked
        .into_iter()
        .enumerate()
        .map(|(i, p)| Standing {
            position: i + 1,
            player_id: p.id,
            name: p.name.clone(),
            total_penalty: p.total_penalty(),
        })
        .collect()
}

/// Share of rounds in which the player did not confess, in percent
///
/// `None` if the player has not played a round yet.
pub fn cooperation_rate(player: &Player) -> Option<f64> {
    let played = player.rounds_played();
    if played == 0 {
        return None;
    }
    let cooperated = player
        .decisions()
        .iter()
        .filter(|d| **d == Decision::Cooperate)
        .count();
    Some(cooperated as f64 * 100.0 / played as f64)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CooperationRate {
    pub player_id: usize,
    pub name: String,
    pub rate: Option<f64>,
}

/// Everything a front-end shows once the game is over
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub equilibrium: Equilibrium,
    pub status: String,
    pub explanation: String,
    pub standings: Vec<Standing>,
    pub cooperation: Vec<CooperationRate>,
    /// Full history; the per-round penalties double as chart series
    pub rounds: Vec<RoundResult>,
}

impl GameReport {
    /// `None` if no round has been played
    pub fn build(players: &[Player], rounds: &[RoundResult]) -> Option<Self> {
        let equilibrium = classify(rounds.last()?);
        Some(Self {
            equilibrium,
            status: equilibrium.status().to_string(),
            explanation: equilibrium.explanation().to_string(),
            standings: standings(players),
            cooperation: players
                .iter()
                .map(|p| CooperationRate {
                    player_id: p.id,
                    name: p.name.clone(),
                    rate: cooperation_rate(p),
                })
                .collect(),
            rounds: rounds.to_vec(),
        })
    }
}
