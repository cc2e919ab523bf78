//! WASM bindings for a browser front-end
//!
//! Session state crosses the boundary as JSON: every call takes the
//! session produced by the previous one and returns the updated session.

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;
use crate::{compute_penalties, describe_strategy, Decision, GameConfig, GameError, Session, Strategy};

fn parse_session(json: &str) -> Result<Session, JsError> {
    Session::from_json(json).map_err(|e| JsError::new(&format!("Invalid session: {}", e)))
}

fn parse_decisions(json: &str) -> Result<Vec<Decision>, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("Invalid decisions: {}", e)))
}

fn game_error(e: GameError) -> JsError {
    JsError::new(&format!("{}: {}", e.kind(), e))
}

#[derive(serde::Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate a game configuration
///
/// Returns `{valid: true}` or `{valid: false, kind: "...", error: "..."}`.
/// Never throws; validation errors are returned as structured data.
#[wasm_bindgen]
pub fn validate_config(config_json: &str) -> JsValue {
    let checked = GameConfig::from_json(config_json)
        .and_then(|config| config.validate())
        .map_err(GameError::from);
    let result = match checked {
        Ok(()) => ValidationResult { valid: true, kind: None, error: None },
        Err(e) => ValidationResult {
            valid: false,
            kind: Some(e.kind().to_string()),
            error: Some(e.to_string()),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Start a game
///
/// # Returns
/// JSON serialized Session
#[wasm_bindgen]
pub fn new_session(config_json: &str) -> Result<String, JsError> {
    let config = GameConfig::from_json(config_json)
        .map_err(|e| game_error(e.into()))?;
    let session = Session::new(config).map_err(game_error)?;
    Ok(session.to_json())
}

/// Play the current round
///
/// # Arguments
/// * `session_json` - Session returned by the previous call
/// * `decisions_json` - One entry per player: `"C"`, `"D"`, or `null` for
///   strategy-driven players
///
/// # Returns
/// JSON serialized Session including the new round
#[wasm_bindgen]
pub fn play_round(session_json: &str, decisions_json: &str) -> Result<String, JsError> {
    let mut session = parse_session(session_json)?;
    let decisions = parse_decisions(decisions_json)?;
    session
        .play_round(&decisions, &mut rand::rng())
        .map_err(game_error)?;
    Ok(session.to_json())
}

/// Play every remaining round (only when no player is manual)
#[wasm_bindgen]
pub fn auto_play(session_json: &str) -> Result<String, JsError> {
    let mut session = parse_session(session_json)?;
    session.auto_play(&mut rand::rng()).map_err(game_error)?;
    Ok(session.to_json())
}

/// Final report: equilibrium, standings, cooperation rates, history
#[wasm_bindgen]
pub fn session_report(session_json: &str) -> Result<JsValue, JsError> {
    let session = parse_session(session_json)?;
    let report = session.report().map_err(game_error)?;
    serde_wasm_bindgen::to_value(&report)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Penalties for a complete decision vector
#[wasm_bindgen]
pub fn compute_round_penalties(decisions_json: &str) -> Result<JsValue, JsError> {
    let decisions = parse_decisions(decisions_json)?;
    let penalties = compute_penalties(&decisions).map_err(game_error)?;
    serde_wasm_bindgen::to_value(&penalties)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

/// Get all available strategies
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = Strategy::ALL
        .into_iter()
        .map(|s| StrategyInfo {
            id: s.id(),
            name: s.name(),
            description: describe_strategy(s),
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Get human-readable description of a strategy
#[wasm_bindgen]
pub fn get_strategy_description(strategy_id: &str) -> Result<String, JsError> {
    let strategy: Strategy = strategy_id
        .parse()
        .map_err(|e| JsError::new(&format!("Invalid strategy: {}", e)))?;
    Ok(describe_strategy(strategy).to_string())
}
