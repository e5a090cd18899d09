//! Headless battle runner: loads a `BattleConfig`, runs `battle::simulate`,
//! and writes the result as JSON. The core is already a plain function, so
//! there is no simulation loop to drive here beyond calling it.

use std::path::Path;

use tracing::info;

use crate::battle::simulate;
use crate::battle::{BattleError, BattleResult};

use super::config::BattleConfig;

pub fn run_from_file(path: &Path) -> Result<BattleResult, String> {
    let config = BattleConfig::load_from_file(path)?;
    run_config(&config)
}

pub fn run_config(config: &BattleConfig) -> Result<BattleResult, String> {
    let player = config.player_placements();
    let enemy = config.enemy_placements();
    let mechanics = config.mechanics_config();

    info!(seed = config.seed, player_units = player.len(), enemy_units = enemy.len(), "starting battle");

    let result = simulate(&player, &enemy, config.seed, Some(mechanics)).map_err(|e: BattleError| e.to_string())?;

    info!(outcome = ?result.outcome, rounds = result.rounds_elapsed, "battle finished");

    if let Some(output_path) = &config.output_path {
        let json = serde_json::to_string_pretty(&result).map_err(|e| format!("failed to serialize result: {e}"))?;
        std::fs::write(output_path, json).map_err(|e| format!("failed to write output file: {e}"))?;
    }

    Ok(result)
}
