//! AI Decider
//!
//! One deterministic decision tree per acting unit, grounded on the target/
//! ability acquisition shape common across the pack's combat AI modules but
//! collapsed from a per-class branch into a single policy, since units here
//! are open catalog data rather than a closed set of hand-tuned classes:
//! cast a ready ability if one has a valid target, else attack an enemy
//! already in range, else step toward the nearest enemy, else wait.

use super::catalog::abilities::Ability;
use super::grid::Position;
use super::pathfinder;
use super::rng::BattleRng;
use super::state::BattleState;
use super::targeting;

#[derive(Debug, Clone)]
pub enum Decision {
    UseAbility { ability_id: String, target_ids: Vec<String> },
    Attack { target_id: String },
    Move { to: Position },
    Wait,
}

/// Decide the acting unit's action for this turn. `rng` must already be the
/// per-turn forked stream (`BattleRng::fork_for_turn`) so ability-targeting
/// randomness never perturbs any other unit's draws.
pub fn decide(state: &BattleState, actor_id: &str, rng: &mut BattleRng) -> Decision {
    let actor = match state.find(actor_id) {
        Some(u) if u.alive => u,
        _ => return Decision::Wait,
    };

    if actor.is_stunned {
        if let Some(decision) = try_usable_while_stunned_ability(state, actor_id, rng) {
            return decision;
        }
        return Decision::Wait;
    }

    for ability_id in &actor.template.ability_ids {
        let Some(Ability::Active { id, range, target_type, effects: _, .. }) = super::catalog::abilities::get(ability_id) else {
            continue;
        };
        if actor.ability_cooldowns.get(id).copied().unwrap_or(0) > 0 {
            continue;
        }
        let targets = targeting::resolve_targets(state, actor, *target_type, *range, rng);
        if !targets.is_empty() {
            return Decision::UseAbility { ability_id: id.clone(), target_ids: targets };
        }
    }

    let range = actor.template.range;
    if let Some(target_id) = targeting::lowest_hp_enemy_in_range(state, actor, range) {
        return Decision::Attack { target_id };
    }

    if let Some(enemy) = targeting::nearest_enemy(state, actor.team, actor.position) {
        if let Some(goal) = targeting::adjacent_goal(state, actor.position, enemy.position) {
            let blocked = state.occupied_positions();
            if let Some(path) = pathfinder::find_path(actor.position, goal, &blocked) {
                let stats = super::status::modified_stats(actor);
                let next = pathfinder::truncate_to_speed(&path, stats.speed);
                if next != actor.position {
                    return Decision::Move { to: next };
                }
            }
        }
    }

    Decision::Wait
}

fn try_usable_while_stunned_ability(state: &BattleState, actor_id: &str, rng: &mut BattleRng) -> Option<Decision> {
    let actor = state.find(actor_id)?;
    for ability_id in &actor.template.ability_ids {
        let Some(Ability::Active { id, range, target_type, usable_while_stunned, .. }) = super::catalog::abilities::get(ability_id)
        else {
            continue;
        };
        if !usable_while_stunned {
            continue;
        }
        if actor.ability_cooldowns.get(id).copied().unwrap_or(0) > 0 {
            continue;
        }
        let targets = targeting::resolve_targets(state, actor, *target_type, *range, rng);
        if !targets.is_empty() {
            return Some(Decision::UseAbility { ability_id: id.clone(), target_ids: targets });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::catalog::units;
    use crate::battle::rng::BattleRng;
    use crate::battle::state::{BattleUnit, Team};
    use std::sync::Arc;

    #[test]
    fn stunned_unit_without_usable_ability_waits() {
        let template = Arc::new(units::test_template());
        let mut actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template);
        actor.is_stunned = true;
        let state = BattleState::new(vec![actor], 1);
        let mut rng = BattleRng::new(1);
        let decision = decide(&state, "player_guardian_0", &mut rng);
        assert!(matches!(decision, Decision::Wait));
    }

    #[test]
    fn moves_toward_out_of_range_enemy() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        let enemy = BattleUnit::new_for_test("bot_guardian_0", Team::Bot, Position::new(5, 0).unwrap(), template);
        let state = BattleState::new(vec![actor, enemy], 1);
        let mut rng = BattleRng::new(1);
        let decision = decide(&state, "player_guardian_0", &mut rng);
        assert!(matches!(decision, Decision::Move { .. }));
    }

    #[test]
    fn attacks_when_enemy_in_range() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        let enemy = BattleUnit::new_for_test("bot_guardian_0", Team::Bot, Position::new(1, 0).unwrap(), template);
        let state = BattleState::new(vec![actor, enemy], 1);
        let mut rng = BattleRng::new(1);
        let decision = decide(&state, "player_guardian_0", &mut rng);
        assert!(matches!(decision, Decision::Attack { .. } | Decision::UseAbility { .. }));
    }
}
