//! Status-Effect Engine
//!
//! Applies/refreshes/stacks effects, ticks durations, applies periodic
//! damage/heal, and recomputes derived stats and flags. Effects are
//! tagged-variant data rather than one `Aura` struct with an `AuraType`
//! discriminant, so stacking/refresh dispatches on the effect's own shape.

use super::catalog::abilities::{AbilityEffect, StatKind};
use super::state::{BattleUnit, StatusEffectInstance, StatusEffectKind};

/// The ongoing-effect subset of `AbilityEffect`s that can be `apply`'d as a
/// status effect. Damage/heal/shield/summon/cleanse/dispel are resolved
/// immediately by the executor instead (see `executor.rs`).
pub fn as_status_kind(effect: &AbilityEffect) -> Option<(StatusEffectKind, u32)> {
    match effect {
        AbilityEffect::Buff(b) => Some((
            StatusEffectKind::Buff {
                stat: b.stat,
                value: b.value,
                percentage: b.percentage,
                stackable: b.stackable,
                max_stacks: b.max_stacks.max(1),
            },
            b.duration,
        )),
        AbilityEffect::Debuff(d) => Some((
            StatusEffectKind::Debuff {
                stat: d.stat,
                value: d.value,
                percentage: d.percentage,
                stackable: d.stackable,
                max_stacks: d.max_stacks.max(1),
            },
            d.duration,
        )),
        AbilityEffect::Stun(s) => Some((StatusEffectKind::Stun, s.duration)),
        AbilityEffect::Taunt(t) => Some((StatusEffectKind::Taunt, t.duration)),
        AbilityEffect::Dot(d) => Some((StatusEffectKind::Dot { value: d.value, damage_type: d.damage_type }, d.duration)),
        AbilityEffect::Hot(h) => Some((StatusEffectKind::Hot { value: h.value }, h.duration)),
        AbilityEffect::Damage(_)
        | AbilityEffect::Heal(_)
        | AbilityEffect::Shield(_)
        | AbilityEffect::Summon(_)
        | AbilityEffect::Cleanse(_)
        | AbilityEffect::Dispel(_) => None,
    }
}

/// Applies a status effect: refuses on a dead unit, stacks or refreshes
/// an existing same-kind effect from the same ability, else appends a
/// fresh instance. Returns `true` if anything changed.
pub fn apply(
    unit: &mut BattleUnit,
    next_id: u64,
    source_ability_id: &str,
    source_unit_instance_id: &str,
    kind: StatusEffectKind,
    duration: u32,
) -> bool {
    if !unit.alive {
        return false;
    }

    let type_tag = kind.type_tag();
    let existing = unit
        .status_effects
        .iter_mut()
        .find(|e| e.source_ability_id == source_ability_id && e.effect.type_tag() == type_tag);

    if let Some(existing) = existing {
        let (stackable, max_stacks) = match &kind {
            StatusEffectKind::Buff { stackable, max_stacks, .. } | StatusEffectKind::Debuff { stackable, max_stacks, .. } => {
                (*stackable, *max_stacks)
            }
            _ => (false, 1),
        };
        if stackable && existing.stacks < max_stacks {
            existing.stacks += 1;
            existing.remaining_duration = existing.remaining_duration.max(duration);
        } else {
            existing.remaining_duration = existing.remaining_duration.max(duration);
        }
        existing.effect = kind;
    } else {
        unit.status_effects.push(StatusEffectInstance {
            id: next_id,
            source_ability_id: source_ability_id.to_string(),
            source_unit_instance_id: source_unit_instance_id.to_string(),
            effect: kind,
            remaining_duration: duration,
            stacks: 1,
        });
    }

    unit.recompute_flags();
    true
}

/// Removes a status effect by id, ignoring unknown ids.
pub fn remove(unit: &mut BattleUnit, effect_id: u64) {
    unit.status_effects.retain(|e| e.id != effect_id);
    unit.recompute_flags();
}

/// Remove every active debuff (negative status), used by `Cleanse`.
pub fn cleanse_all(unit: &mut BattleUnit) {
    unit.status_effects.retain(|e| !matches!(e.effect, StatusEffectKind::Debuff { .. } | StatusEffectKind::Stun));
    unit.recompute_flags();
}

/// Remove every active buff, used by `Dispel`.
pub fn dispel_all(unit: &mut BattleUnit) {
    unit.status_effects.retain(|e| !matches!(e.effect, StatusEffectKind::Buff { .. }));
    unit.recompute_flags();
}

/// Result of ticking one unit's statuses for a round: the net HP delta
/// (dot damage already subtracted, hot healing already added, both
/// clamped) and whether the unit died from DoT this tick.
pub struct TickResult {
    pub died: bool,
}

/// Accumulates DoT/HoT across all active effects, decrements durations,
/// expires effects that hit zero, then applies the accumulated HP delta
/// once (DoT first, then HoT) and clamps.
pub fn tick(unit: &mut BattleUnit) -> TickResult {
    if !unit.alive {
        return TickResult { died: false };
    }

    let mut dot_damage = 0.0f32;
    let mut hot_heal = 0.0f32;

    for effect in &mut unit.status_effects {
        match &effect.effect {
            StatusEffectKind::Dot { value, .. } => dot_damage += value * effect.stacks as f32,
            StatusEffectKind::Hot { value } => hot_heal += value * effect.stacks as f32,
            _ => {}
        }
        effect.remaining_duration = effect.remaining_duration.saturating_sub(1);
    }
    unit.status_effects.retain(|e| e.remaining_duration > 0);

    unit.current_hp = (unit.current_hp - dot_damage).clamp(0.0, unit.max_hp);
    unit.current_hp = (unit.current_hp + hot_heal).clamp(0.0, unit.max_hp);
    unit.alive = unit.current_hp > 0.0;
    unit.recompute_flags();

    TickResult { died: !unit.alive }
}

/// Derived, buff-adjusted stats. HP is never modified by buffs.
#[derive(Debug, Clone, Copy)]
pub struct ModifiedStats {
    pub atk: f32,
    pub armor: f32,
    pub speed: u32,
    pub initiative: u32,
    pub dodge: u32,
}

/// Base stats plus the sum of flat contributions (each times stacks),
/// times `(1 + sum of percentage contributions times stacks)`, then
/// clamped per-stat.
pub fn modified_stats(unit: &BattleUnit) -> ModifiedStats {
    let base = unit.template.stats;

    let mut flat = StatTotals::default();
    let mut pct = StatTotals::default();

    for effect in &unit.status_effects {
        let (stat, value, percentage, sign) = match &effect.effect {
            StatusEffectKind::Buff { stat, value, percentage, .. } => (*stat, *value, *percentage, 1.0f32),
            StatusEffectKind::Debuff { stat, value, percentage, .. } => (*stat, *value, *percentage, -1.0f32),
            _ => continue,
        };
        let stacks = effect.stacks as f32;
        if let Some(v) = value {
            flat.add(stat, sign * v * stacks);
        }
        if let Some(p) = percentage {
            pct.add(stat, sign.abs() * p * stacks * sign.signum());
        }
    }

    let atk = round_half_away_from_zero((base.atk + flat.atk) * (1.0 + pct.atk)).max(1.0);
    let armor = round_half_away_from_zero((base.armor + flat.armor) * (1.0 + pct.armor)).max(0.0);
    let speed = round_half_away_from_zero((base.speed as f32 + flat.speed) * (1.0 + pct.speed)).max(1.0) as u32;
    let initiative =
        round_half_away_from_zero((base.initiative as f32 + flat.initiative) * (1.0 + pct.initiative)).max(0.0) as u32;
    let dodge = (round_half_away_from_zero((base.dodge as f32 + flat.dodge) * (1.0 + pct.dodge)) as i32).clamp(0, 100) as u32;

    ModifiedStats { atk, armor, speed, initiative, dodge }
}

/// Round-half-away-from-zero: percentage-buff rounding resolves 0.5
/// outward, not to even.
fn round_half_away_from_zero(v: f32) -> f32 {
    if v >= 0.0 {
        (v + 0.5).floor()
    } else {
        (v - 0.5).ceil()
    }
}

#[derive(Default, Clone, Copy)]
struct StatTotals {
    atk: f32,
    armor: f32,
    speed: f32,
    initiative: f32,
    dodge: f32,
}

impl StatTotals {
    fn add(&mut self, stat: StatKind, amount: f32) {
        match stat {
            StatKind::Atk => self.atk += amount,
            StatKind::Armor => self.armor += amount,
            StatKind::Speed => self.speed += amount,
            StatKind::Initiative => self.initiative += amount,
            StatKind::Dodge => self.dodge += amount,
        }
    }
}
