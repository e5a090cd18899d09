//! The battle's owned data: `BattleUnit`, `StatusEffectInstance`, and the
//! `BattleState` that threads through the simulation loop as a value, not a
//! graph: no shared references, no aliasing.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::abilities::{DamageType, StatKind};
use super::catalog::units::UnitTemplate;
use super::grid::Position;
use super::rng::BattleRng;

/// One of the two sides in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Player,
    Bot,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Bot,
            Team::Bot => Team::Player,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Player => "player",
            Team::Bot => "bot",
        }
    }
}

/// The ongoing-effect subset of `AbilityEffect` that a `StatusEffectInstance`
/// actually carries once applied (shields are tracked separately on the
/// unit, not as a status effect).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatusEffectKind {
    Buff { stat: StatKind, value: Option<f32>, percentage: Option<f32>, stackable: bool, max_stacks: u32 },
    Debuff { stat: StatKind, value: Option<f32>, percentage: Option<f32>, stackable: bool, max_stacks: u32 },
    Stun,
    Taunt,
    Dot { value: f32, damage_type: DamageType },
    Hot { value: f32 },
}

impl StatusEffectKind {
    /// Discriminant used for the "same `(sourceAbilityId, effect.type)`"
    /// stacking/refresh rule.
    pub fn type_tag(&self) -> &'static str {
        match self {
            StatusEffectKind::Buff { .. } => "buff",
            StatusEffectKind::Debuff { .. } => "debuff",
            StatusEffectKind::Stun => "stun",
            StatusEffectKind::Taunt => "taunt",
            StatusEffectKind::Dot { .. } => "dot",
            StatusEffectKind::Hot { .. } => "hot",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffectInstance {
    pub id: u64,
    pub source_ability_id: String,
    pub source_unit_instance_id: String,
    pub effect: StatusEffectKind,
    pub remaining_duration: u32,
    pub stacks: u32,
}

/// A per-battle unit instance: an immutable template reference plus the
/// mutable combat state that changes turn to turn.
#[derive(Debug, Clone)]
pub struct BattleUnit {
    pub instance_id: String,
    pub team: Team,
    pub template: Arc<UnitTemplate>,
    pub position: Position,
    pub alive: bool,
    pub current_hp: f32,
    pub max_hp: f32,
    /// Ability id -> remaining rounds until castable again. Shared between
    /// Active cooldowns and Passive internal cooldowns, a single
    /// `abilityCooldowns` map rather than two parallel ones.
    pub ability_cooldowns: HashMap<String, u32>,
    pub status_effects: Vec<StatusEffectInstance>,
    pub is_stunned: bool,
    pub has_taunt: bool,
    pub taunt_duration: Option<u32>,
    /// FIFO-consumed absorb shields.
    pub shields: Vec<f32>,
    /// Tracks which `HpBelow` passives have already fired, since a passive
    /// with `max_triggers` must not refire once the HP condition is already
    /// true on a later turn.
    pub triggered_passives: Vec<String>,
    /// Scratch integer state owned by individual mechanic handlers (e.g.
    /// `ammunition`'s remaining-shots counter, `facing`/`charge`'s
    /// turn-start position snapshot). Keyed by the handler's own name so
    /// unrelated mechanics never collide.
    pub mechanic_counters: HashMap<String, i32>,
}

impl BattleUnit {
    pub fn new(instance_id: String, team: Team, position: Position, template: Arc<UnitTemplate>) -> Self {
        let max_hp = template.stats.hp;
        Self {
            instance_id,
            team,
            template,
            position,
            alive: true,
            current_hp: max_hp,
            max_hp,
            ability_cooldowns: HashMap::new(),
            status_effects: Vec::new(),
            is_stunned: false,
            has_taunt: false,
            taunt_duration: None,
            shields: Vec::new(),
            triggered_passives: Vec::new(),
            mechanic_counters: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn new_for_test(instance_id: &str, team: Team, position: Position, template: Arc<UnitTemplate>) -> Self {
        Self::new(instance_id.to_string(), team, position, template)
    }

    /// Recompute `is_stunned`/`has_taunt` from the current status list:
    /// true iff some active effect of that kind has duration > 0.
    pub fn recompute_flags(&mut self) {
        self.is_stunned = self
            .status_effects
            .iter()
            .any(|e| matches!(e.effect, StatusEffectKind::Stun) && e.remaining_duration > 0);
        let taunt = self
            .status_effects
            .iter()
            .find(|e| matches!(e.effect, StatusEffectKind::Taunt) && e.remaining_duration > 0);
        self.has_taunt = taunt.is_some();
        self.taunt_duration = taunt.map(|e| e.remaining_duration);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// The simulation-internal state threaded through the loop. Sub-components
/// read it and return a transformed value; there is exactly one owner at a
/// time.
pub struct BattleState {
    pub units: Vec<BattleUnit>,
    pub current_round: u32,
    pub rng: BattleRng,
    pub seed: u32,
    next_effect_id: u64,
    next_instance_index: HashMap<String, u32>,
}

impl BattleState {
    pub fn new(units: Vec<BattleUnit>, seed: u32) -> Self {
        Self {
            units,
            current_round: 0,
            rng: BattleRng::new(seed),
            seed,
            next_effect_id: 0,
            next_instance_index: HashMap::new(),
        }
    }

    /// Derive a fresh, unique status-effect id. Deterministic because it is
    /// a simple counter on state owned exclusively by this battle.
    pub fn next_status_id(&mut self) -> u64 {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        id
    }

    /// Allocate the next index for a template id, used to form
    /// `"{team}_{templateId}_{index}"` instance ids for both the initial
    /// roster and any mid-battle summons.
    pub fn next_index_for(&mut self, template_id: &str) -> u32 {
        let entry = self.next_instance_index.entry(template_id.to_string()).or_insert(0);
        let idx = *entry;
        *entry += 1;
        idx
    }

    /// Cells currently occupied by a live unit. Rebuilt on demand rather
    /// than incrementally maintained, so it can never drift from `units`.
    pub fn occupied_positions(&self) -> HashMap<Position, usize> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.alive)
            .map(|(i, u)| (u.position, i))
            .collect()
    }

    pub fn unit_at(&self, pos: Position) -> Option<&BattleUnit> {
        self.units.iter().find(|u| u.alive && u.position == pos)
    }

    pub fn find(&self, instance_id: &str) -> Option<&BattleUnit> {
        self.units.iter().find(|u| u.instance_id == instance_id)
    }

    pub fn find_mut(&mut self, instance_id: &str) -> Option<&mut BattleUnit> {
        self.units.iter_mut().find(|u| u.instance_id == instance_id)
    }

    pub fn living_on_team(&self, team: Team) -> impl Iterator<Item = &BattleUnit> {
        self.units.iter().filter(move |u| u.alive && u.team == team)
    }

    pub fn team_alive(&self, team: Team) -> bool {
        self.units.iter().any(|u| u.alive && u.team == team)
    }
}
