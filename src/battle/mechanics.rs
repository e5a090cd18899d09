//! Mechanics Processor
//!
//! A pure fold of named handlers over six fixed phases per acting unit's
//! turn: `TurnStart`, `Movement`, `PreAttack`, `Attack`, `PostAttack`,
//! `TurnEnd`. The `Mvp` preset registers no handlers, so its fold is the
//! identity transform — the simulation loop behaves exactly as if this
//! module didn't exist. `Tactical` and `Roguelike` register a growing
//! subset of the fourteen named mechanics, each hooking the one or two
//! phases its registry entry names. Modeled on a layered-system design
//! where many small handler functions chain in a fixed order; here each
//! handler is a plain function over owned state rather than an ECS system.

use serde::{Deserialize, Serialize};

use super::catalog::abilities::{DamageType, StatKind};
use super::events::BattleEvent;
use super::state::{BattleState, StatusEffectKind};
use super::status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TurnStart,
    Movement,
    PreAttack,
    Attack,
    PostAttack,
    TurnEnd,
}

/// One of the fourteen named mechanics. Variant names are the idiomatic-Rust
/// spelling of the registry's own names (`lineOfSight` -> `LineOfSight`,
/// `armorShred` -> `ArmorShred`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanicId {
    Facing,
    Resolve,
    Engagement,
    Flanking,
    Riposte,
    Intercept,
    Aura,
    Charge,
    Overwatch,
    Phalanx,
    LineOfSight,
    Ammunition,
    Contagion,
    ArmorShred,
}

impl MechanicId {
    /// The full registry, in the order it's listed: `facing, resolve,
    /// engagement, flanking, riposte, intercept, aura, charge, overwatch,
    /// phalanx, lineOfSight, ammunition, contagion, armorShred`.
    pub const ALL: [MechanicId; 14] = [
        MechanicId::Facing,
        MechanicId::Resolve,
        MechanicId::Engagement,
        MechanicId::Flanking,
        MechanicId::Riposte,
        MechanicId::Intercept,
        MechanicId::Aura,
        MechanicId::Charge,
        MechanicId::Overwatch,
        MechanicId::Phalanx,
        MechanicId::LineOfSight,
        MechanicId::Ammunition,
        MechanicId::Contagion,
        MechanicId::ArmorShred,
    ];

    /// The phase(s) this mechanic hooks. Seven mechanics hook two phases;
    /// the other seven hook exactly one.
    pub fn phases(self) -> &'static [Phase] {
        match self {
            MechanicId::Facing => &[Phase::Movement, Phase::Attack],
            MechanicId::Resolve => &[Phase::TurnEnd, Phase::PostAttack],
            MechanicId::Engagement => &[Phase::PreAttack, Phase::Movement],
            MechanicId::Flanking => &[Phase::PreAttack],
            MechanicId::Riposte => &[Phase::PostAttack],
            MechanicId::Intercept => &[Phase::Movement],
            MechanicId::Aura => &[Phase::TurnStart, Phase::TurnEnd],
            MechanicId::Charge => &[Phase::Movement, Phase::Attack],
            MechanicId::Overwatch => &[Phase::TurnEnd],
            MechanicId::Phalanx => &[Phase::TurnStart],
            MechanicId::LineOfSight => &[Phase::PreAttack],
            MechanicId::Ammunition => &[Phase::Attack, Phase::TurnEnd],
            MechanicId::Contagion => &[Phase::TurnEnd, Phase::PostAttack],
            MechanicId::ArmorShred => &[Phase::PostAttack],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MechanicsPreset {
    Mvp,
    Tactical,
    Roguelike,
}

impl MechanicsPreset {
    pub fn mechanics(self) -> &'static [MechanicId] {
        match self {
            MechanicsPreset::Mvp => &[],
            MechanicsPreset::Tactical => &MechanicId::ALL[..6],
            MechanicsPreset::Roguelike => &MechanicId::ALL,
        }
    }
}

/// An explicit per-mechanic on/off record — the "14-key record" shape the
/// external interface accepts as an alternative to a named preset. Each
/// field defaults to `false`, so `MechanicsRecord::default()` is the MVP
/// no-op baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicsRecord {
    pub facing: bool,
    pub resolve: bool,
    pub engagement: bool,
    pub flanking: bool,
    pub riposte: bool,
    pub intercept: bool,
    pub aura: bool,
    pub charge: bool,
    pub overwatch: bool,
    pub phalanx: bool,
    pub line_of_sight: bool,
    pub ammunition: bool,
    pub contagion: bool,
    pub armor_shred: bool,
}

impl MechanicsRecord {
    /// The mechanics this record enables, in registry order.
    pub fn enabled(&self) -> Vec<MechanicId> {
        let flags = [
            self.facing,
            self.resolve,
            self.engagement,
            self.flanking,
            self.riposte,
            self.intercept,
            self.aura,
            self.charge,
            self.overwatch,
            self.phalanx,
            self.line_of_sight,
            self.ammunition,
            self.contagion,
            self.armor_shred,
        ];
        MechanicId::ALL.iter().copied().zip(flags).filter_map(|(id, on)| on.then_some(id)).collect()
    }
}

/// Either a named preset or an explicit per-mechanic record. A caller that
/// wants `TACTICAL` minus `riposte`, say, uses the explicit form instead of
/// the closest preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MechanicsConfig {
    Preset(MechanicsPreset),
    Explicit(MechanicsRecord),
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        MechanicsConfig::Preset(MechanicsPreset::Mvp)
    }
}

impl MechanicsConfig {
    pub fn enabled_mechanics(&self) -> Vec<MechanicId> {
        match self {
            MechanicsConfig::Preset(preset) => preset.mechanics().to_vec(),
            MechanicsConfig::Explicit(record) => record.enabled(),
        }
    }
}

/// Run every mechanic in `enabled` that hooks `phase`, in registry order,
/// against the acting unit. Each handler may mutate `state` and push
/// events; an empty `enabled` slice is a true no-op, never touching `state`
/// or `events`.
pub fn run_phase(enabled: &[MechanicId], phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    for &id in enabled {
        if id.phases().contains(&phase) {
            apply_mechanic(id, phase, state, round, actor_id, events);
        }
    }
}

fn apply_mechanic(id: MechanicId, phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match id {
        MechanicId::Facing => facing(phase, state, round, actor_id, events),
        MechanicId::Resolve => resolve(phase, state, round, actor_id, events),
        MechanicId::Engagement => engagement(state, round, actor_id, events),
        MechanicId::Flanking => flanking(state, round, actor_id, events),
        MechanicId::Riposte => riposte(state, round, actor_id, events),
        MechanicId::Intercept => intercept(state, round, actor_id, events),
        MechanicId::Aura => aura(state, round, actor_id, events),
        MechanicId::Charge => charge(phase, state, round, actor_id, events),
        MechanicId::Overwatch => overwatch(state, round, actor_id, events),
        MechanicId::Phalanx => phalanx(state, round, actor_id, events),
        MechanicId::LineOfSight => line_of_sight(state, round, actor_id, events),
        MechanicId::Ammunition => ammunition(phase, state, round, actor_id, events),
        MechanicId::Contagion => contagion(phase, state, round, actor_id, events),
        MechanicId::ArmorShred => armor_shred(state, round, actor_id, events),
    }
}

/// A unit that hasn't relocated since the `movement` hook fires its attack
/// from a braced stance: +8% armor for the round.
fn facing(phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match phase {
        Phase::Movement => snapshot_position(state, actor_id, "facing"),
        Phase::Attack => {
            if !moved_since_snapshot(state, actor_id, "facing") {
                buff_self(state, round, actor_id, "mechanic_facing", StatKind::Armor, None, Some(0.08), 1, events);
            }
        }
        _ => {}
    }
}

/// A unit still fighting below half HP shakes off one active debuff after
/// its action, and grits out a small self-heal at the end of its turn.
fn resolve(phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match phase {
        Phase::PostAttack => {
            if let Some(actor) = state.find_mut(actor_id) {
                if let Some(idx) = actor.status_effects.iter().position(|e| matches!(e.effect, StatusEffectKind::Debuff { .. })) {
                    actor.status_effects.remove(idx);
                    actor.recompute_flags();
                    events.push(BattleEvent::StatusExpired { round, target_id: actor_id.to_string(), effect_kind: "debuff".to_string() });
                }
            }
        }
        Phase::TurnEnd => {
            let low_hp = state.find(actor_id).map(|a| a.alive && a.current_hp / a.max_hp < 0.5).unwrap_or(false);
            if low_hp {
                if let Some(actor) = state.find_mut(actor_id) {
                    let heal = actor.max_hp * 0.03;
                    actor.current_hp = (actor.current_hp + heal).min(actor.max_hp);
                    events.push(BattleEvent::HealApplied { round, source_id: actor_id.to_string(), target_id: actor_id.to_string(), amount: heal, target_hp: actor.current_hp });
                }
            }
        }
        _ => {}
    }
}

/// +10% armor while at least one enemy is within 1 cell, rewarding melee
/// commitment. Hooked into both `movement` (before the step) and
/// `pre_attack` (before the swing) so the bonus covers the whole close-
/// quarters turn.
fn engagement(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let adjacent_enemy = state
        .find(actor_id)
        .map(|a| state.living_on_team(a.team.opponent()).any(|e| a.position.distance(&e.position) <= 1))
        .unwrap_or(false);
    if adjacent_enemy {
        buff_self(state, round, actor_id, "mechanic_engagement", StatKind::Armor, None, Some(0.1), 1, events);
    }
}

/// A unit backed by at least two adjacent allies with an enemy within
/// striking distance fights from a flank: +15% atk for the turn.
fn flanking(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let flanked = state
        .find(actor_id)
        .map(|a| {
            let allies_adjacent =
                state.living_on_team(a.team).filter(|u| u.instance_id != a.instance_id && a.position.distance(&u.position) <= 1).count();
            let enemy_near = state.living_on_team(a.team.opponent()).any(|e| a.position.distance(&e.position) <= 2);
            allies_adjacent >= 2 && enemy_near
        })
        .unwrap_or(false);
    if flanked {
        buff_self(state, round, actor_id, "mechanic_flanking", StatKind::Atk, None, Some(0.15), 1, events);
    }
}

/// After acting, a unit stays poised to punish the next hit against it:
/// +5 flat dodge for one round.
fn riposte(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    buff_self(state, round, actor_id, "mechanic_riposte", StatKind::Dodge, Some(5.0), None, 1, events);
}

/// A unit adjacent to a more wounded ally steps in to guard them: +3 flat
/// armor for the round.
fn intercept(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let guarding = state
        .find(actor_id)
        .map(|a| {
            let own_fraction = a.current_hp / a.max_hp;
            state
                .living_on_team(a.team)
                .any(|u| u.instance_id != a.instance_id && a.position.distance(&u.position) <= 1 && u.current_hp / u.max_hp < own_fraction)
        })
        .unwrap_or(false);
    if guarding {
        buff_self(state, round, actor_id, "mechanic_intercept", StatKind::Armor, Some(3.0), None, 1, events);
    }
}

/// Pulses a small atk buff to every living ally within 2 cells, at both the
/// start and the end of the acting unit's turn.
fn aura(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let Some((team, origin)) = state.find(actor_id).map(|a| (a.team, a.position)) else { return };
    let allies: Vec<String> =
        state.living_on_team(team).filter(|u| u.instance_id != actor_id && origin.distance(&u.position) <= 2).map(|u| u.instance_id.clone()).collect();
    for ally_id in allies {
        apply_to(
            state,
            round,
            actor_id,
            &ally_id,
            "mechanic_aura",
            StatusEffectKind::Buff { stat: StatKind::Atk, value: None, percentage: Some(0.05), stackable: false, max_stacks: 1 },
            1,
            "buff",
            events,
        );
    }
}

/// A unit that covered at least 2 cells of ground before attacking carries
/// momentum into the swing: +20% atk for the round.
fn charge(phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match phase {
        Phase::Movement => snapshot_position(state, actor_id, "charge"),
        Phase::Attack => {
            if traveled_since_snapshot(state, actor_id, "charge") >= 2 {
                buff_self(state, round, actor_id, "mechanic_charge", StatKind::Atk, None, Some(0.2), 1, events);
            }
        }
        _ => {}
    }
}

/// A unit with no enemy within its own attack range this round spends the
/// turn watching the field instead: +10 flat dodge next round.
fn overwatch(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let watching = state
        .find(actor_id)
        .map(|a| !state.living_on_team(a.team.opponent()).any(|e| a.position.distance(&e.position) <= a.template.range))
        .unwrap_or(false);
    if watching {
        buff_self(state, round, actor_id, "mechanic_overwatch", StatKind::Dodge, Some(10.0), None, 1, events);
    }
}

/// Two or more adjacent living allies at the start of the turn form a
/// shield wall: +12% armor for the round.
fn phalanx(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let formed = state
        .find(actor_id)
        .map(|a| state.living_on_team(a.team).filter(|u| u.instance_id != a.instance_id && a.position.distance(&u.position) <= 1).count() >= 2)
        .unwrap_or(false);
    if formed {
        buff_self(state, round, actor_id, "mechanic_phalanx", StatKind::Armor, None, Some(0.12), 1, events);
    }
}

/// A ranged unit crowded by its own ally within 1 cell has its sightline
/// blocked: -10% atk for the round.
fn line_of_sight(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let blocked = state
        .find(actor_id)
        .map(|a| a.template.range > 1 && state.living_on_team(a.team).any(|u| u.instance_id != a.instance_id && a.position.distance(&u.position) <= 1))
        .unwrap_or(false);
    if blocked {
        debuff_self(state, round, actor_id, "mechanic_line_of_sight", StatKind::Atk, None, Some(0.1), 1, events);
    }
}

const AMMUNITION_MAX: i32 = 3;

/// Each attack spends one of a limited pool of shots; a dry unit fights at
/// -25% atk until ammunition regenerates, one per turn-end, up to the cap.
fn ammunition(phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match phase {
        Phase::Attack => {
            let depleted = if let Some(actor) = state.find_mut(actor_id) {
                let slot = actor.mechanic_counters.entry("ammunition".to_string()).or_insert(AMMUNITION_MAX);
                *slot = (*slot - 1).max(0);
                *slot == 0
            } else {
                false
            };
            if depleted {
                debuff_self(state, round, actor_id, "mechanic_ammunition", StatKind::Atk, None, Some(0.25), 1, events);
            }
        }
        Phase::TurnEnd => {
            if let Some(actor) = state.find_mut(actor_id) {
                let slot = actor.mechanic_counters.entry("ammunition".to_string()).or_insert(AMMUNITION_MAX);
                *slot = (*slot + 1).min(AMMUNITION_MAX);
            }
        }
        _ => {}
    }
}

/// If the unit the actor just struck is already carrying a DoT, the
/// infection spreads to living enemies adjacent to that target. A unit
/// that itself carries a DoT at its own turn end passes a weaker copy to
/// the nearest living enemy.
fn contagion(phase: Phase, state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    match phase {
        Phase::PostAttack => {
            let Some(target_id) = last_action_target(events, round, actor_id) else { return };
            let has_dot = state.find(&target_id).map(|t| t.status_effects.iter().any(|e| matches!(e.effect, StatusEffectKind::Dot { .. }))).unwrap_or(false);
            if !has_dot {
                return;
            }
            let Some((team, origin)) = state.find(&target_id).map(|t| (t.team, t.position)) else { return };
            let spread_to: Vec<String> =
                state.living_on_team(team).filter(|u| u.instance_id != target_id && origin.distance(&u.position) <= 1).map(|u| u.instance_id.clone()).collect();
            for id in spread_to {
                apply_to(
                    state,
                    round,
                    actor_id,
                    &id,
                    "mechanic_contagion",
                    StatusEffectKind::Dot { value: 1.0, damage_type: DamageType::Physical },
                    2,
                    "dot",
                    events,
                );
            }
        }
        Phase::TurnEnd => {
            let carries_dot = state.find(actor_id).map(|a| a.status_effects.iter().any(|e| matches!(e.effect, StatusEffectKind::Dot { .. }))).unwrap_or(false);
            if !carries_dot {
                return;
            }
            let Some((opponent, origin)) = state.find(actor_id).map(|a| (a.team.opponent(), a.position)) else { return };
            let nearest = state.living_on_team(opponent).filter(|u| origin.distance(&u.position) <= 1).map(|u| u.instance_id.clone()).min();
            if let Some(nearest) = nearest {
                apply_to(
                    state,
                    round,
                    actor_id,
                    &nearest,
                    "mechanic_contagion",
                    StatusEffectKind::Dot { value: 1.0, damage_type: DamageType::Physical },
                    2,
                    "dot",
                    events,
                );
            }
        }
        _ => {}
    }
}

/// The target of the actor's last attack this turn takes a stacking armor
/// debuff, wearing down its defenses over repeated hits.
fn armor_shred(state: &mut BattleState, round: u32, actor_id: &str, events: &mut Vec<BattleEvent>) {
    let Some(target_id) = last_action_target(events, round, actor_id) else { return };
    apply_to(
        state,
        round,
        actor_id,
        &target_id,
        "mechanic_armor_shred",
        StatusEffectKind::Debuff { stat: StatKind::Armor, value: Some(2.0), percentage: None, stackable: true, max_stacks: 5 },
        2,
        "debuff",
        events,
    );
}

fn snapshot_position(state: &mut BattleState, actor_id: &str, key: &str) {
    if let Some(actor) = state.find_mut(actor_id) {
        let (x, y) = (actor.position.x as i32, actor.position.y as i32);
        actor.mechanic_counters.insert(format!("{key}_x"), x);
        actor.mechanic_counters.insert(format!("{key}_y"), y);
    }
}

fn moved_since_snapshot(state: &BattleState, actor_id: &str, key: &str) -> bool {
    traveled_since_snapshot(state, actor_id, key) > 0
}

fn traveled_since_snapshot(state: &BattleState, actor_id: &str, key: &str) -> u32 {
    let Some(actor) = state.find(actor_id) else { return 0 };
    let ox = actor.mechanic_counters.get(&format!("{key}_x")).copied().unwrap_or(actor.position.x as i32);
    let oy = actor.mechanic_counters.get(&format!("{key}_y")).copied().unwrap_or(actor.position.y as i32);
    let dx = (actor.position.x as i32 - ox).unsigned_abs();
    let dy = (actor.position.y as i32 - oy).unsigned_abs();
    dx.max(dy)
}

/// Finds the target of the actor's own most recent attack or ability cast
/// this round, by scanning the event log already accumulated this turn.
fn last_action_target(events: &[BattleEvent], round: u32, actor_id: &str) -> Option<String> {
    events.iter().rev().find_map(|e| match e {
        BattleEvent::Attack { round: r, actor_id: a, target_id, .. } if *r == round && a == actor_id => Some(target_id.clone()),
        BattleEvent::AbilityCast { round: r, actor_id: a, target_ids, .. } if *r == round && a == actor_id => target_ids.first().cloned(),
        _ => None,
    })
}

fn buff_self(
    state: &mut BattleState,
    round: u32,
    actor_id: &str,
    source: &str,
    stat: StatKind,
    value: Option<f32>,
    percentage: Option<f32>,
    duration: u32,
    events: &mut Vec<BattleEvent>,
) {
    apply_to(
        state,
        round,
        actor_id,
        actor_id,
        source,
        StatusEffectKind::Buff { stat, value, percentage, stackable: false, max_stacks: 1 },
        duration,
        "buff",
        events,
    );
}

fn debuff_self(
    state: &mut BattleState,
    round: u32,
    actor_id: &str,
    source: &str,
    stat: StatKind,
    value: Option<f32>,
    percentage: Option<f32>,
    duration: u32,
    events: &mut Vec<BattleEvent>,
) {
    apply_to(
        state,
        round,
        actor_id,
        actor_id,
        source,
        StatusEffectKind::Debuff { stat, value, percentage, stackable: false, max_stacks: 1 },
        duration,
        "debuff",
        events,
    );
}

#[allow(clippy::too_many_arguments)]
fn apply_to(
    state: &mut BattleState,
    round: u32,
    source_id: &str,
    target_id: &str,
    source: &str,
    kind: StatusEffectKind,
    duration: u32,
    tag: &str,
    events: &mut Vec<BattleEvent>,
) {
    let status_id = state.next_status_id();
    if let Some(target) = state.find_mut(target_id) {
        if status::apply(target, status_id, source, source_id, kind, duration) {
            events.push(BattleEvent::StatusApplied {
                round,
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                ability_id: source.to_string(),
                effect_kind: tag.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::catalog::units;
    use crate::battle::grid::Position;
    use crate::battle::state::{BattleUnit, Team};
    use std::sync::Arc;

    #[test]
    fn mvp_preset_registers_no_mechanics() {
        assert!(MechanicsPreset::Mvp.mechanics().is_empty());
    }

    #[test]
    fn tactical_preset_is_the_named_six() {
        assert_eq!(
            MechanicsPreset::Tactical.mechanics(),
            &[MechanicId::Facing, MechanicId::Resolve, MechanicId::Engagement, MechanicId::Flanking, MechanicId::Riposte, MechanicId::Intercept]
        );
    }

    #[test]
    fn roguelike_preset_enables_all_fourteen() {
        assert_eq!(MechanicsPreset::Roguelike.mechanics().len(), 14);
    }

    #[test]
    fn mvp_phase_run_is_a_no_op() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template);
        let mut state = BattleState::new(vec![actor], 1);
        let mut events = Vec::new();
        let before_hp = state.units[0].current_hp;
        run_phase(MechanicsPreset::Mvp.mechanics(), Phase::TurnStart, &mut state, 1, "player_guardian_0", &mut events);
        assert!(events.is_empty());
        assert_eq!(state.units[0].current_hp, before_hp);
    }

    #[test]
    fn explicit_record_enables_only_its_set_fields() {
        let record = MechanicsRecord { engagement: true, riposte: true, ..Default::default() };
        assert_eq!(record.enabled(), vec![MechanicId::Engagement, MechanicId::Riposte]);
    }

    #[test]
    fn engagement_buffs_armor_when_enemy_adjacent() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        let enemy = BattleUnit::new_for_test("bot_guardian_0", Team::Bot, Position::new(1, 0).unwrap(), template);
        let mut state = BattleState::new(vec![actor, enemy], 1);
        let mut events = Vec::new();
        run_phase(&[MechanicId::Engagement], Phase::PreAttack, &mut state, 1, "player_guardian_0", &mut events);
        assert!(!events.is_empty());
        assert!(!state.units[0].status_effects.is_empty());
    }

    #[test]
    fn phalanx_requires_two_adjacent_allies() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(1, 1).unwrap(), template.clone());
        let ally_a = BattleUnit::new_for_test("player_guardian_1", Team::Player, Position::new(0, 1).unwrap(), template.clone());
        let mut state = BattleState::new(vec![actor, ally_a], 1);
        let mut events = Vec::new();
        run_phase(&[MechanicId::Phalanx], Phase::TurnStart, &mut state, 1, "player_guardian_0", &mut events);
        assert!(events.is_empty(), "one adjacent ally should not form a phalanx");

        let ally_b = BattleUnit::new_for_test("player_guardian_2", Team::Player, Position::new(2, 1).unwrap(), template);
        state.units.push(ally_b);
        run_phase(&[MechanicId::Phalanx], Phase::TurnStart, &mut state, 1, "player_guardian_0", &mut events);
        assert!(!events.is_empty());
    }

    #[test]
    fn armor_shred_debuffs_the_last_struck_target() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_guardian_0", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        let target = BattleUnit::new_for_test("bot_guardian_0", Team::Bot, Position::new(1, 0).unwrap(), template);
        let mut state = BattleState::new(vec![actor, target], 1);
        let mut events = vec![BattleEvent::Attack {
            round: 1,
            actor_id: "player_guardian_0".to_string(),
            target_id: "bot_guardian_0".to_string(),
            damage: 5.0,
            damage_type: DamageType::Physical,
            dodged: false,
            shield_absorbed: 0.0,
            target_remaining_hp: 95.0,
        }];
        run_phase(&[MechanicId::ArmorShred], Phase::PostAttack, &mut state, 1, "player_guardian_0", &mut events);
        assert!(!state.units[1].status_effects.is_empty());
    }

    #[test]
    fn ammunition_depletes_and_regenerates() {
        let template = Arc::new(units::test_template());
        let actor = BattleUnit::new_for_test("player_archer_0", Team::Player, Position::new(0, 0).unwrap(), template);
        let mut state = BattleState::new(vec![actor], 1);
        let mut events = Vec::new();
        for _ in 0..AMMUNITION_MAX {
            run_phase(&[MechanicId::Ammunition], Phase::Attack, &mut state, 1, "player_archer_0", &mut events);
        }
        assert_eq!(*state.units[0].mechanic_counters.get("ammunition").unwrap(), 0);
        assert!(state.units[0].status_effects.iter().any(|e| matches!(e.effect, StatusEffectKind::Debuff { .. })));

        run_phase(&[MechanicId::Ammunition], Phase::TurnEnd, &mut state, 1, "player_archer_0", &mut events);
        assert_eq!(*state.units[0].mechanic_counters.get("ammunition").unwrap(), 1);
    }
}
