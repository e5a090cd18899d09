//! Simulation Loop (C12) and the crate's single public entrypoint,
//! `simulate`. Pure function: given two rosters and a seed, it returns a
//! `BattleResult` that is byte-identical across runs, processes, and
//! platforms. Grounded on `shawntabrizi-open-auto-battler`'s
//! `resolve_battle(player_board, enemy_board, seed) -> Vec<CombatEvent>`
//! shape (`core/src/battle.rs`), generalized with a roster-deployment
//! validation pass run once per match before the round loop starts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ai;
use super::catalog::units;
use super::error::BattleError;
use super::events::BattleEvent;
use super::executor;
use super::grid::{self, Position};
pub use super::mechanics::{MechanicId, MechanicsConfig, MechanicsPreset, MechanicsRecord};
use super::mechanics::{self, Phase};
use super::queue;
use super::state::{BattleState, BattleUnit, Team};
use super::status;

/// Maximum number of rounds before the battle is forced to a draw.
pub const MAX_ROUNDS: u32 = 100;

/// Maximum units on a single roster.
pub const MAX_ROSTER_SIZE: usize = 12;

/// One unit's starting placement, as supplied by the caller (the
/// input-adaptation layer, not part of the deterministic core itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub template_id: String,
    pub x: i32,
    pub y: i32,
    /// Overrides the catalog template's max/current HP, used by scenario
    /// setups that need a specific HP without a bespoke template.
    #[serde(default)]
    pub hp_override: Option<f32>,
    /// Overrides the catalog template's armor stat.
    #[serde(default)]
    pub armor_override: Option<f32>,
}

impl UnitPlacement {
    pub fn new(template_id: impl Into<String>, x: i32, y: i32) -> Self {
        Self { template_id: template_id.into(), x, y, hp_override: None, armor_override: None }
    }

    pub fn with_hp(mut self, hp: f32) -> Self {
        self.hp_override = Some(hp);
        self
    }

    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor_override = Some(armor);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerVictory,
    BotVictory,
    Draw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleResult {
    pub outcome: Outcome,
    pub rounds_elapsed: u32,
    pub seed: u32,
    pub events: Vec<BattleEvent>,
}

/// Run a full battle to completion. `player_team`/`enemy_team` are the
/// starting roster placements; `mechanics` defaults to the MVP preset
/// (an identity fold over zero handlers) when omitted.
pub fn simulate(
    player_team: &[UnitPlacement],
    enemy_team: &[UnitPlacement],
    seed: u32,
    mechanics_config: Option<MechanicsConfig>,
) -> Result<BattleResult, BattleError> {
    let mechanics_config = mechanics_config.unwrap_or_default();
    let enabled_mechanics = mechanics_config.enabled_mechanics();
    let mut state = build_initial_state(player_team, enemy_team, seed)?;

    let mut events = Vec::new();

    while state.current_round < MAX_ROUNDS {
        if !state.team_alive(Team::Player) || !state.team_alive(Team::Bot) {
            break;
        }

        state.current_round += 1;
        let round = state.current_round;
        events.push(BattleEvent::RoundStart { round });

        let turn_order = queue::build_turn_order(&state);
        for actor_id in turn_order {
            if !state.team_alive(Team::Player) || !state.team_alive(Team::Bot) {
                break;
            }
            let Some(actor) = state.find(&actor_id) else { continue };
            if !actor.alive {
                continue;
            }

            run_passive_turn_start(&mut state, round, &actor_id, &mut events);
            decrement_actor_cooldown_window(&mut state, &actor_id);

            mechanics::run_phase(&enabled_mechanics, Phase::TurnStart, &mut state, round, &actor_id, &mut events);
            mechanics::run_phase(&enabled_mechanics, Phase::Movement, &mut state, round, &actor_id, &mut events);
            mechanics::run_phase(&enabled_mechanics, Phase::PreAttack, &mut state, round, &actor_id, &mut events);

            let Some(actor) = state.find(&actor_id) else { continue };
            if !actor.alive {
                continue;
            }
            let mut turn_rng = state.rng.fork_for_turn(state.seed, round, actor);
            let decision = ai::decide(&state, &actor_id, &mut turn_rng);
            let mut action_events = executor::execute(&mut state, round, &actor_id, decision, &mut turn_rng);
            events.append(&mut action_events);

            mechanics::run_phase(&enabled_mechanics, Phase::Attack, &mut state, round, &actor_id, &mut events);
            mechanics::run_phase(&enabled_mechanics, Phase::PostAttack, &mut state, round, &actor_id, &mut events);
            mechanics::run_phase(&enabled_mechanics, Phase::TurnEnd, &mut state, round, &actor_id, &mut events);
        }

        tick_round_end(&mut state, round, &mut events);
        events.push(BattleEvent::RoundEnd { round });
    }

    let outcome = determine_outcome(&state);
    events.push(BattleEvent::BattleEnd { round: state.current_round, outcome: outcome_tag(outcome).to_string() });

    Ok(BattleResult { outcome, rounds_elapsed: state.current_round, seed, events })
}

fn build_initial_state(player_team: &[UnitPlacement], enemy_team: &[UnitPlacement], seed: u32) -> Result<BattleState, BattleError> {
    validate_roster(player_team, "player")?;
    validate_roster(enemy_team, "bot")?;

    let mut state = BattleState::new(Vec::new(), seed);
    let mut occupied: std::collections::HashMap<Position, String> = std::collections::HashMap::new();

    for placement in player_team.iter() {
        place_unit(&mut state, placement, Team::Player, &mut occupied)?;
    }
    for placement in enemy_team.iter() {
        place_unit(&mut state, placement, Team::Bot, &mut occupied)?;
    }

    Ok(state)
}

fn validate_roster(team: &[UnitPlacement], label: &'static str) -> Result<(), BattleError> {
    if team.is_empty() {
        return Err(BattleError::EmptyTeam { team: label });
    }
    if team.len() > MAX_ROSTER_SIZE {
        return Err(BattleError::TeamTooLarge { team: label, max: MAX_ROSTER_SIZE, got: team.len() });
    }
    Ok(())
}

fn place_unit(
    state: &mut BattleState,
    placement: &UnitPlacement,
    team: Team,
    occupied: &mut std::collections::HashMap<Position, String>,
) -> Result<(), BattleError> {
    let template = units::get(&placement.template_id).ok_or_else(|| BattleError::UnknownUnitTemplate(placement.template_id.clone()))?;

    let position = Position::new(placement.x, placement.y)
        .ok_or(BattleError::PositionOutOfBounds { x: placement.x, y: placement.y, width: grid::WIDTH, height: grid::HEIGHT })?;

    if !grid::in_deployment_zone(team, position) {
        let idx = state.next_index_for(&placement.template_id);
        return Err(BattleError::InvalidDeploymentPosition {
            instance_id: format!("{}_{}_{}", team.as_str(), placement.template_id, idx),
            x: position.x,
            y: position.y,
        });
    }

    if let Some(existing) = occupied.get(&position) {
        let idx = state.next_index_for(&placement.template_id);
        let this_id = format!("{}_{}_{}", team.as_str(), placement.template_id, idx);
        return Err(BattleError::DuplicatePosition { a: existing.clone(), b: this_id, x: position.x, y: position.y });
    }

    let idx = state.next_index_for(&placement.template_id);
    let instance_id = format!("{}_{}_{}", team.as_str(), placement.template_id, idx);
    occupied.insert(position, instance_id.clone());

    let mut owned_template = template.clone();
    if let Some(armor) = placement.armor_override {
        owned_template.stats.armor = armor;
    }

    let mut unit = BattleUnit::new(instance_id, team, position, Arc::new(owned_template));
    if let Some(hp) = placement.hp_override {
        unit.max_hp = hp;
        unit.current_hp = hp;
    }
    state.units.push(unit);
    Ok(())
}

fn decrement_actor_cooldown_window(state: &mut BattleState, actor_id: &str) {
    if let Some(actor) = state.find_mut(actor_id) {
        for cooldown in actor.ability_cooldowns.values_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }
    }
}

/// Check this actor's own passive abilities at the start of its turn:
/// `TurnStart`-triggered passives fire on internal cooldown, `HpBelow`
/// passives fire once the HP fraction first crosses the threshold, capped
/// by `max_triggers`.
fn run_passive_turn_start(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let Some(actor) = state.find(actor_id) else { return };
    let passive_ids: Vec<String> = actor.template.ability_ids.clone();
    let hp_fraction = actor.current_hp / actor.max_hp;

    for ability_id in passive_ids {
        let Some(super::catalog::abilities::Ability::Passive { id, trigger, trigger_threshold, internal_cooldown, max_triggers, effects }) =
            super::catalog::abilities::get(&ability_id).cloned()
        else {
            continue;
        };

        let ready = state.find(actor_id).map(|a| a.ability_cooldowns.get(&id).copied().unwrap_or(0) == 0).unwrap_or(false);
        if !ready {
            continue;
        }

        let should_fire = match trigger {
            super::catalog::abilities::PassiveTrigger::TurnStart => true,
            super::catalog::abilities::PassiveTrigger::HpBelow => {
                let threshold = trigger_threshold.unwrap_or(0.0);
                hp_fraction <= threshold
            }
        };
        if !should_fire {
            continue;
        }

        if let Some(max) = max_triggers {
            let already = state.find(actor_id).map(|a| a.triggered_passives.iter().filter(|p| **p == id).count() as u32).unwrap_or(0);
            if already >= max {
                continue;
            }
        }

        if let Some(actor) = state.find_mut(actor_id) {
            if let Some(cd) = internal_cooldown {
                actor.ability_cooldowns.insert(id.clone(), cd);
            }
            actor.triggered_passives.push(id.clone());
        }

        let caster_atk = state.find(actor_id).map(|a| status::modified_stats(a).atk).unwrap_or(0.0);
        for effect in &effects {
            events.extend(apply_passive_effect(state, round, actor_id, &id, effect, caster_atk));
        }
    }
}

fn apply_passive_effect(
    state: &mut BattleState,
    round: u32,
    actor_id: &str,
    ability_id: &str,
    effect: &super::catalog::abilities::AbilityEffect,
    caster_atk: f32,
) -> Vec<BattleEvent> {
    use super::catalog::abilities::AbilityEffect;
    let mut events = Vec::new();
    match effect {
        AbilityEffect::Hot(h) => {
            let status_id = state.next_status_id();
            if let Some(actor) = state.find_mut(actor_id) {
                if status::apply(
                    actor,
                    status_id,
                    ability_id,
                    actor_id,
                    super::state::StatusEffectKind::Hot { value: h.value },
                    h.duration,
                ) {
                    events.push(BattleEvent::StatusApplied {
                        round,
                        source_id: actor_id.to_string(),
                        target_id: actor_id.to_string(),
                        ability_id: ability_id.to_string(),
                        effect_kind: "hot".to_string(),
                    });
                }
            }
        }
        AbilityEffect::Heal(h) => {
            if let Some(actor) = state.find_mut(actor_id) {
                actor.current_hp = (actor.current_hp + h.value).min(actor.max_hp);
            }
        }
        AbilityEffect::Buff(b) => {
            let status_id = state.next_status_id();
            if let Some(actor) = state.find_mut(actor_id) {
                status::apply(
                    actor,
                    status_id,
                    ability_id,
                    actor_id,
                    super::state::StatusEffectKind::Buff {
                        stat: b.stat,
                        value: b.value,
                        percentage: b.percentage,
                        stackable: b.stackable,
                        max_stacks: b.max_stacks.max(1),
                    },
                    b.duration,
                );
            }
        }
        _ => {
            let _ = caster_atk;
        }
    }
    events
}

fn tick_round_end(state: &mut BattleState, round: u32, events: &mut Vec<BattleEvent>) {
    let ids: Vec<String> = state.units.iter().filter(|u| u.alive).map(|u| u.instance_id.clone()).collect();
    for id in ids {
        let expired: Vec<&'static str> = state
            .find(&id)
            .map(|u| u.status_effects.iter().filter(|e| e.remaining_duration <= 1).map(|e| e.effect.type_tag()).collect())
            .unwrap_or_default();

        let dot_amount: f32 = state
            .find(&id)
            .map(|u| {
                u.status_effects
                    .iter()
                    .filter_map(|e| match &e.effect {
                        super::state::StatusEffectKind::Dot { value, .. } => Some(*value * e.stacks as f32),
                        _ => None,
                    })
                    .sum()
            })
            .unwrap_or(0.0);

        if let Some(unit) = state.find_mut(&id) {
            let result = status::tick(unit);
            let hp = unit.current_hp;
            if dot_amount > 0.0 {
                events.push(BattleEvent::DotTicked { round, target_id: id.clone(), amount: dot_amount, target_hp: hp });
            }
            for kind in expired {
                events.push(BattleEvent::StatusExpired { round, target_id: id.clone(), effect_kind: kind.to_string() });
            }
            if result.died {
                events.push(BattleEvent::UnitDefeated { round, unit_id: id.clone(), team: unit.team });
            }
        }
    }
}

fn determine_outcome(state: &BattleState) -> Outcome {
    let player_alive = state.team_alive(Team::Player);
    let bot_alive = state.team_alive(Team::Bot);
    match (player_alive, bot_alive) {
        (true, false) => Outcome::PlayerVictory,
        (false, true) => Outcome::BotVictory,
        _ => Outcome::Draw,
    }
}

fn outcome_tag(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::PlayerVictory => "player_victory",
        Outcome::BotVictory => "bot_victory",
        Outcome::Draw => "draw",
    }
}
