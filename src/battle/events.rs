//! `BattleEvent`: the append-only log the simulation emits, one entry per
//! discrete thing that happened. Shaped as a
//! tagged enum with a flat payload, the same "smart payload" approach as
//! `shawntabrizi-open-auto-battler`'s `CombatEvent` in `core/src/battle.rs`,
//! so a replay viewer can match on `type` without inspecting a grab-bag of
//! optional fields.

use serde::{Deserialize, Serialize};

use super::catalog::abilities::DamageType;
use super::grid::Position;
use super::state::Team;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleEvent {
    RoundStart { round: u32 },
    RoundEnd { round: u32 },

    Move { round: u32, actor_id: String, from_position: Position, to_position: Position },

    Attack {
        round: u32,
        actor_id: String,
        target_id: String,
        damage: f32,
        damage_type: DamageType,
        dodged: bool,
        shield_absorbed: f32,
        target_remaining_hp: f32,
    },

    AbilityCast {
        round: u32,
        actor_id: String,
        ability_id: String,
        target_ids: Vec<String>,
    },

    StatusApplied { round: u32, source_id: String, target_id: String, ability_id: String, effect_kind: String },
    StatusExpired { round: u32, target_id: String, effect_kind: String },

    HealApplied { round: u32, source_id: String, target_id: String, amount: f32, target_hp: f32 },
    DotTicked { round: u32, target_id: String, amount: f32, target_hp: f32 },

    UnitSummoned { round: u32, source_id: String, unit_id: String, template_id: String, position: Position },
    UnitDefeated { round: u32, unit_id: String, team: Team },

    BattleEnd { round: u32, outcome: String },
}

impl BattleEvent {
    pub fn round(&self) -> u32 {
        match self {
            BattleEvent::RoundStart { round }
            | BattleEvent::RoundEnd { round }
            | BattleEvent::Move { round, .. }
            | BattleEvent::Attack { round, .. }
            | BattleEvent::AbilityCast { round, .. }
            | BattleEvent::StatusApplied { round, .. }
            | BattleEvent::StatusExpired { round, .. }
            | BattleEvent::HealApplied { round, .. }
            | BattleEvent::DotTicked { round, .. }
            | BattleEvent::UnitSummoned { round, .. }
            | BattleEvent::UnitDefeated { round, .. }
            | BattleEvent::BattleEnd { round, .. } => *round,
        }
    }
}
