//! Terminal front-end for the Prisoner's Dilemma simulator
//!
//! Collects the configuration from flags or a JSON file, prompts manual
//! players for their decisions and prints the round history and final
//! analysis.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Select;
use dilemma_logic::{Decision, GameConfig, GameError, GameMode, Phase, PlayerConfig, SeededRng, Session, Strategy};
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "dilemma", about = "Multi-player Prisoner's Dilemma simulator")]
struct Args {
    /// Load the game configuration from a JSON file
    #[arg(long, conflicts_with_all = ["players", "repeated", "rounds", "seats"])]
    config: Option<PathBuf>,

    /// Number of players (2-5); defaults to the number of seats, at least 2
    #[arg(short, long)]
    players: Option<usize>,

    /// Play repeated rounds instead of a single round
    #[arg(long)]
    repeated: bool,

    /// Number of rounds in repeated mode (5-50)
    #[arg(short, long, default_value_t = 10)]
    rounds: u32,

    /// Seat as NAME=STRATEGY or STRATEGY, in seat order
    /// (manual, always-cooperate, always-defect, tit-for-tat, random)
    #[arg(short = 's', long = "seat", value_parser = parse_seat)]
    seats: Vec<PlayerConfig>,

    /// Seed the random source for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Play all rounds without pausing when no player is manual
    #[arg(long)]
    skip: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return GameConfig::from_json(&text)
                .with_context(|| format!("parsing {}", path.display()));
        }

        Ok(GameConfig {
            mode: if self.repeated { GameMode::Repeated } else { GameMode::Single },
            player_count: self.players.unwrap_or(self.seats.len().max(2)),
            round_count: self.rounds,
            players: self.seats.clone(),
        })
    }
}

fn parse_seat(arg: &str) -> Result<PlayerConfig, String> {
    let (name, strategy) = match arg.split_once('=') {
        Some((name, strategy)) => (Some(name.trim().to_string()), strategy),
        None => (None, arg),
    };
    let strategy: Strategy = strategy.parse().map_err(|e| format!("{}", e))?;
    Ok(PlayerConfig { name, strategy })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = args.game_config()?;
    let mut session = Session::new(config).context("cannot start the game")?;
    if !args.json {
        println!("{}", render::intro(session.config()));
    }

    match args.seed {
        Some(seed) => play(&mut session, &mut SeededRng::from_u64(seed), args.skip)?,
        None => play(&mut session, &mut rand::rng(), args.skip)?,
    }

    let report = session.report()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::history(session.players(), session.rounds()));
        println!("{}", render::report(&report));
    }
    Ok(())
}

/// Run rounds until the session is finished
fn play<R: Rng + ?Sized>(session: &mut Session, rng: &mut R, skip: bool) -> Result<()> {
    let names: Vec<String> = session.players().iter().map(|p| p.name.clone()).collect();

    while let Phase::InProgress { round } = session.phase() {
        if skip && !session.has_manual_players() {
            let played = session.auto_play(rng)?;
            log::info!("skipped {} rounds", played);
            break;
        }

        println!("{}", render::round_header(round, session.total_rounds()));
        let decisions = prompt_decisions(session)?;
        match session.play_round(&decisions, rng) {
            Ok(result) => println!("{}", render::round(&names, result)),
            Err(e @ GameError::IncompleteDecision { .. }) => {
                eprintln!("{}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Ask every manual player for a decision; strategy seats stay unset
fn prompt_decisions(session: &Session) -> Result<Vec<Decision>> {
    let mut decisions = session.blank_decisions();
    for (seat, player) in session.players().iter().enumerate() {
        if !player.strategy.is_manual() {
            continue;
        }
        let choice = Select::new()
            .with_prompt(format!("{} ({} years so far)", player.name, player.total_penalty()))
            .items(&["Don't confess", "Confess"])
            .default(0)
            .interact()
            .with_context(|| format!("reading decision for {}", player.name))?;
        decisions[seat] = if choice == 0 { Decision::Cooperate } else { Decision::Defect };
    }
    Ok(decisions)
}
