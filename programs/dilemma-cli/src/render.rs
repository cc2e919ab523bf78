//! Plain-text rendering of rounds and reports

use dilemma_logic::{GameConfig, GameMode, GameReport, Player, RoundResult};

/// Game settings and the seat list, printed before the first round
pub fn intro(config: &GameConfig) -> String {
    let mode = match config.mode {
        GameMode::Single => "Single round".to_string(),
        GameMode::Repeated => format!("Repeated, {} rounds", config.total_rounds()),
    };
    let mut out = format!("{} players. {}\n", config.player_count, mode);
    for seat in 0..config.player_count {
        out.push_str(&format!(
            "  {:<16} {}\n",
            config.player_name(seat),
            config.player_strategy(seat).name()
        ));
    }
    out
}

pub fn round_header(round: u32, total: u32) -> String {
    format!("== Round {} of {} ==", round, total)
}

/// One scored round, one line per player
pub fn round(names: &[String], result: &RoundResult) -> String {
    names
        .iter()
        .zip(&result.decisions)
        .zip(&result.penalties)
        .map(|((name, decision), penalty)| {
            format!("  {:<16} {:<16} {:>3} years\n", name, decision.label(), penalty)
        })
        .collect()
}

/// Full history table: a row per round, a column per player
pub fn history(players: &[Player], rounds: &[RoundResult]) -> String {
    let mut out = String::from("Round");
    for player in players {
        out.push_str(&format!(" | {:<12}", player.name));
    }
    out.push('\n');

    for result in rounds {
        out.push_str(&format!("#{:<4}", result.round));
        for (decision, penalty) in result.decisions.iter().zip(&result.penalties) {
            let cell = format!("{} {}y", decision, penalty);
            out.push_str(&format!(" | {:<12}", cell));
        }
        out.push('\n');
    }
    out
}

pub fn report(report: &GameReport) -> String {
    let mut out = String::from("Final standings (fewest years wins)\n");
    for standing in &report.standings {
        out.push_str(&format!(
            "  {}. {:<16} {:>4} years\n",
            standing.position, standing.name, standing.total_penalty
        ));
    }

    out.push_str("\nCooperation rate (didn't confess)\n");
    for rate in &report.cooperation {
        let line = match rate.rate {
            Some(rate_pct) => format!("  {:<16} {:>5.1}%\n", rate.name, rate_pct),
            None => format!("  {:<16}   n/a\n", rate.name),
        };
        out.push_str(&line);
    }

    out.push_str(&format!("\n{}\n{}", report.status, report.explanation));
    out
}
