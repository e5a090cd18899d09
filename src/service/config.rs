//! JSON battle configuration, the input-adaptation layer outside the
//! deterministic core. Mirrors the `team1`/`team2`-plus-seed-and-output-path
//! shape common to the pack's headless match configs, but resolves into
//! the core's `UnitPlacement`s instead of an ECS-framework match config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::simulate::{MechanicsConfig, MechanicsPreset, UnitPlacement};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacementConfig {
    pub template_id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub hp_override: Option<f32>,
    #[serde(default)]
    pub armor_override: Option<f32>,
}

/// A battle configuration loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleConfig {
    pub player_team: Vec<UnitPlacementConfig>,
    pub enemy_team: Vec<UnitPlacementConfig>,
    pub seed: u32,
    #[serde(default)]
    pub mechanics_preset: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl BattleConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read config file: {e}"))?;
        let config: BattleConfig = serde_json::from_str(&contents).map_err(|e| format!("failed to parse JSON: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.player_team.is_empty() {
            return Err("player_team must have at least one unit".to_string());
        }
        if self.enemy_team.is_empty() {
            return Err("enemy_team must have at least one unit".to_string());
        }
        Ok(())
    }

    pub fn player_placements(&self) -> Vec<UnitPlacement> {
        self.player_team.iter().map(resolve_placement).collect()
    }

    pub fn enemy_placements(&self) -> Vec<UnitPlacement> {
        self.enemy_team.iter().map(resolve_placement).collect()
    }

    pub fn mechanics_config(&self) -> MechanicsConfig {
        let preset = match self.mechanics_preset.as_deref() {
            Some("tactical") => MechanicsPreset::Tactical,
            Some("roguelike") => MechanicsPreset::Roguelike,
            _ => MechanicsPreset::Mvp,
        };
        MechanicsConfig::Preset(preset)
    }
}

fn resolve_placement(unit: &UnitPlacementConfig) -> UnitPlacement {
    UnitPlacement {
        template_id: legacy_template_alias(&unit.template_id),
        x: unit.x,
        y: unit.y,
        hp_override: unit.hp_override,
        armor_override: unit.armor_override,
    }
}

/// Maps legacy class names onto this catalog's unit ids, so an
/// older-style config file still resolves to a real template instead of
/// erroring. This belongs to the input-adaptation layer outside the core,
/// not the catalog itself.
fn legacy_template_alias(template_id: &str) -> String {
    match template_id {
        "Warrior" => "knight".to_string(),
        "Mage" => "mage".to_string(),
        "Healer" => "priest".to_string(),
        "Rogue" => "rogue".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_class_names_resolve_to_catalog_ids() {
        let unit = UnitPlacementConfig { template_id: "Warrior".to_string(), x: 0, y: 0, hp_override: None, armor_override: None };
        let placement = resolve_placement(&unit);
        assert_eq!(placement.template_id, "knight");
        assert!(crate::battle::catalog::units::get(&placement.template_id).is_some());
    }

    #[test]
    fn unrecognized_template_id_passes_through() {
        let unit = UnitPlacementConfig { template_id: "archer".to_string(), x: 0, y: 0, hp_override: None, armor_override: None };
        let placement = resolve_placement(&unit);
        assert_eq!(placement.template_id, "archer");
    }
}
