//! Action Executor
//!
//! Resolves one unit's chosen `ai::Decision` into state mutations and the
//! `BattleEvent`s it produced. Damage always drains shields (FIFO, oldest
//! first) before HP, the same absorb-then-HP order common across the
//! pack's combat damage pipelines.

use super::ai::Decision;
use super::catalog::abilities::{Ability, AbilityEffect, DamageType};
use super::events::BattleEvent;
use super::rng::BattleRng;
use super::state::{BattleState, BattleUnit, StatusEffectKind};
use super::status;

/// Resolve `decision` for `actor_id`, returning the events it produced in
/// order. `rng` must be the per-turn forked stream for this actor.
pub fn execute(state: &mut BattleState, round: u32, actor_id: &str, decision: Decision, rng: &mut BattleRng) -> Vec<BattleEvent> {
    match decision {
        Decision::Wait => Vec::new(),
        Decision::Move { to } => execute_move(state, round, actor_id, to),
        Decision::Attack { target_id } => execute_attack(state, round, actor_id, &target_id, rng),
        Decision::UseAbility { ability_id, target_ids } => execute_ability(state, round, actor_id, &ability_id, &target_ids, rng),
    }
}

fn execute_move(state: &mut BattleState, round: u32, actor_id: &str, to: super::grid::Position) -> Vec<BattleEvent> {
    let Some(actor) = state.find_mut(actor_id) else { return Vec::new() };
    let from = actor.position;
    actor.position = to;
    vec![BattleEvent::Move { round, actor_id: actor_id.to_string(), from_position: from, to_position: to }]
}

fn execute_attack(state: &mut BattleState, round: u32, actor_id: &str, target_id: &str, rng: &mut BattleRng) -> Vec<BattleEvent> {
    let Some(actor) = state.find(actor_id) else { return Vec::new() };
    let atk_count = actor.template.stats.atk_count.max(1);
    let atk_stats = status::modified_stats(actor);
    let mut events = Vec::new();

    for _ in 0..atk_count {
        if !state.find(target_id).map(|t| t.alive).unwrap_or(false) {
            break;
        }
        let target_stats = {
            let target = state.find(target_id).unwrap();
            status::modified_stats(target)
        };
        let dodged = rng.chance(target_stats.dodge as f64 / 100.0);
        let raw = atk_stats.atk;
        let damage = if dodged { 0.0 } else { mitigate(raw, DamageType::Physical, target_stats.armor) };

        let (absorbed, target_hp) = apply_damage(state, target_id, damage);
        events.push(BattleEvent::Attack {
            round,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            damage,
            damage_type: DamageType::Physical,
            dodged,
            shield_absorbed: absorbed,
            target_remaining_hp: target_hp,
        });
        events.extend(finalize_if_dead(state, round, target_id));
    }

    events
}

fn execute_ability(
    state: &mut BattleState,
    round: u32,
    actor_id: &str,
    ability_id: &str,
    target_ids: &[String],
    rng: &mut BattleRng,
) -> Vec<BattleEvent> {
    let Some(Ability::Active { cooldown, effects, .. }) = super::catalog::abilities::get(ability_id).cloned() else {
        return Vec::new();
    };

    let mut events = vec![BattleEvent::AbilityCast {
        round,
        actor_id: actor_id.to_string(),
        ability_id: ability_id.to_string(),
        target_ids: target_ids.to_vec(),
    }];

    if let Some(actor) = state.find_mut(actor_id) {
        actor.ability_cooldowns.insert(ability_id.to_string(), cooldown);
    }

    let caster_atk = state.find(actor_id).map(|u| status::modified_stats(u).atk).unwrap_or(0.0);

    for effect in &effects {
        for target_id in target_ids {
            events.extend(apply_effect(state, round, actor_id, target_id, ability_id, effect, caster_atk, rng));
        }
    }

    events
}

fn apply_effect(
    state: &mut BattleState,
    round: u32,
    source_id: &str,
    target_id: &str,
    ability_id: &str,
    effect: &AbilityEffect,
    caster_atk: f32,
    rng: &mut BattleRng,
) -> Vec<BattleEvent> {
    let mut events = Vec::new();

    match effect {
        AbilityEffect::Damage(d) => {
            let target_stats = match state.find(target_id) {
                Some(t) => status::modified_stats(t),
                None => return events,
            };
            let dodged = rng.chance(target_stats.dodge as f64 / 100.0);
            let raw = d.value + d.attack_scaling.unwrap_or(0.0) * caster_atk;
            let damage = if dodged {
                0.0
            } else if d.damage_type == DamageType::True {
                raw
            } else {
                mitigate(raw, d.damage_type, target_stats.armor)
            };
            let (absorbed, hp) = apply_damage(state, target_id, damage);
            events.push(BattleEvent::Attack {
                round,
                actor_id: source_id.to_string(),
                target_id: target_id.to_string(),
                damage,
                damage_type: d.damage_type,
                dodged,
                shield_absorbed: absorbed,
                target_remaining_hp: hp,
            });
            events.extend(finalize_if_dead(state, round, target_id));
        }

        AbilityEffect::Heal(h) => {
            if let Some(target) = state.find_mut(target_id) {
                if target.alive {
                    target.current_hp = (target.current_hp + h.value).min(target.max_hp);
                    events.push(BattleEvent::HealApplied {
                        round,
                        source_id: source_id.to_string(),
                        target_id: target_id.to_string(),
                        amount: h.value,
                        target_hp: target.current_hp,
                    });
                }
            }
        }

        AbilityEffect::Shield(s) => {
            if let Some(target) = state.find_mut(target_id) {
                if target.alive {
                    target.shields.push(s.amount);
                }
            }
        }

        AbilityEffect::Buff(m) | AbilityEffect::Debuff(m) => {
            let is_debuff = matches!(effect, AbilityEffect::Debuff(_));
            let kind = if is_debuff {
                StatusEffectKind::Debuff { stat: m.stat, value: m.value, percentage: m.percentage, stackable: m.stackable, max_stacks: m.max_stacks.max(1) }
            } else {
                StatusEffectKind::Buff { stat: m.stat, value: m.value, percentage: m.percentage, stackable: m.stackable, max_stacks: m.max_stacks.max(1) }
            };
            apply_status(state, round, source_id, target_id, ability_id, kind, m.duration, &mut events);
        }

        AbilityEffect::Stun(s) => {
            apply_status(state, round, source_id, target_id, ability_id, StatusEffectKind::Stun, s.duration, &mut events);
        }

        AbilityEffect::Taunt(t) => {
            apply_status(state, round, source_id, target_id, ability_id, StatusEffectKind::Taunt, t.duration, &mut events);
        }

        AbilityEffect::Dot(d) => {
            apply_status(state, round, source_id, target_id, ability_id, StatusEffectKind::Dot { value: d.value, damage_type: d.damage_type }, d.duration, &mut events);
        }

        AbilityEffect::Hot(h) => {
            apply_status(state, round, source_id, target_id, ability_id, StatusEffectKind::Hot { value: h.value }, h.duration, &mut events);
        }

        AbilityEffect::Cleanse(_) => {
            if let Some(target) = state.find_mut(target_id) {
                status::cleanse_all(target);
            }
        }

        AbilityEffect::Dispel(_) => {
            if let Some(target) = state.find_mut(target_id) {
                status::dispel_all(target);
            }
        }

        AbilityEffect::Summon(s) => {
            events.extend(execute_summon(state, round, source_id, &s.unit_template_id));
        }
    }

    events
}

fn apply_status(
    state: &mut BattleState,
    round: u32,
    source_id: &str,
    target_id: &str,
    ability_id: &str,
    kind: StatusEffectKind,
    duration: u32,
    events: &mut Vec<BattleEvent>,
) {
    let id = state.next_status_id();
    let type_tag = kind.type_tag();
    if let Some(target) = state.find_mut(target_id) {
        if status::apply(target, id, ability_id, source_id, kind, duration) {
            events.push(BattleEvent::StatusApplied {
                round,
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                ability_id: ability_id.to_string(),
                effect_kind: type_tag.to_string(),
            });
        }
    }
}

fn execute_summon(state: &mut BattleState, round: u32, source_id: &str, template_id: &str) -> Vec<BattleEvent> {
    let Some(template) = super::catalog::units::get(template_id) else { return Vec::new() };
    let Some(source) = state.find(source_id) else { return Vec::new() };
    let team = source.team;
    let occupied = state.occupied_positions();
    let Some(spot) = find_open_adjacent(source.position, &occupied) else { return Vec::new() };

    let idx = state.next_index_for(template_id);
    let instance_id = format!("{}_{}_{}", team.as_str(), template_id, idx);
    let unit = BattleUnit::new(instance_id.clone(), team, spot, std::sync::Arc::new(template.clone()));
    state.units.push(unit);

    vec![BattleEvent::UnitSummoned { round, source_id: source_id.to_string(), unit_id: instance_id, template_id: template_id.to_string(), position: spot }]
}

fn find_open_adjacent(
    origin: super::grid::Position,
    occupied: &std::collections::HashMap<super::grid::Position, usize>,
) -> Option<super::grid::Position> {
    origin.neighbors().into_iter().find(|p| !occupied.contains_key(p))
}

/// Physical damage is reduced flat by armor (floor 1 if the hit connects);
/// magical damage is reduced by half armor; true damage is never reduced
/// elsewhere, callers skip this for `DamageType::True`.
fn mitigate(raw: f32, damage_type: DamageType, armor: f32) -> f32 {
    match damage_type {
        DamageType::Physical => (raw - armor).max(1.0),
        DamageType::Magical => (raw - armor * 0.5).max(1.0),
        DamageType::True => raw,
    }
    .max(0.0)
}

/// Drain `damage` from `target`'s shields (oldest first) before HP.
/// Returns `(amount absorbed by shields, resulting HP)`.
fn apply_damage(state: &mut BattleState, target_id: &str, damage: f32) -> (f32, f32) {
    let Some(target) = state.find_mut(target_id) else { return (0.0, 0.0) };
    if !target.alive || damage <= 0.0 {
        return (0.0, target.current_hp);
    }

    let mut remaining = damage;
    let mut absorbed = 0.0;
    while remaining > 0.0 {
        let Some(front) = target.shields.first_mut() else { break };
        if *front >= remaining {
            *front -= remaining;
            absorbed += remaining;
            remaining = 0.0;
        } else {
            absorbed += *front;
            remaining -= *front;
            target.shields.remove(0);
        }
    }
    target.shields.retain(|s| *s > 0.0);

    target.current_hp = (target.current_hp - remaining).max(0.0);
    if target.current_hp <= 0.0 {
        target.alive = false;
    }
    (absorbed, target.current_hp)
}

fn finalize_if_dead(state: &mut BattleState, round: u32, target_id: &str) -> Vec<BattleEvent> {
    match state.find(target_id) {
        Some(t) if !t.alive => vec![BattleEvent::UnitDefeated { round, unit_id: target_id.to_string(), team: t.team }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::catalog::units;
    use crate::battle::grid::Position;
    use crate::battle::state::Team;
    use std::sync::Arc;

    fn unit(id: &str, team: Team, pos: (i32, i32)) -> BattleUnit {
        BattleUnit::new_for_test(id, team, Position::new(pos.0, pos.1).unwrap(), Arc::new(units::test_template()))
    }

    #[test]
    fn damage_drains_shield_before_hp() {
        let mut state = BattleState::new(vec![unit("bot_guardian_0", Team::Bot, (0, 0))], 1);
        state.units[0].shields.push(5.0);
        let (absorbed, hp) = apply_damage(&mut state, "bot_guardian_0", 8.0);
        assert_eq!(absorbed, 5.0);
        assert_eq!(hp, state.units[0].max_hp - 3.0);
    }

    #[test]
    fn lethal_damage_marks_unit_dead_and_emits_event() {
        let mut state = BattleState::new(vec![unit("bot_guardian_0", Team::Bot, (0, 0))], 1);
        state.units[0].current_hp = 2.0;
        apply_damage(&mut state, "bot_guardian_0", 10.0);
        let events = finalize_if_dead(&mut state, 1, "bot_guardian_0");
        assert_eq!(events.len(), 1);
        assert!(!state.units[0].alive);
    }

    #[test]
    fn move_updates_position_and_emits_event() {
        let mut state = BattleState::new(vec![unit("player_guardian_0", Team::Player, (0, 0))], 1);
        let to = Position::new(1, 0).unwrap();
        let events = execute_move(&mut state, 1, "player_guardian_0", to);
        assert_eq!(state.units[0].position, to);
        assert_eq!(events.len(), 1);
    }
}
