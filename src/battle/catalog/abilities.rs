//! Ability Catalog (C4)
//!
//! Static table of ability definitions and the effect atoms they compose:
//! one function, matched once per ability id, returning an owned
//! definition. Hand-authored Rust rather than parsed from an external RON
//! file, so a malformed entry is a compile error instead of a runtime
//! parse failure (see DESIGN.md).

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Physical/magical/true damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
    True,
}

/// Which derived stat a buff/debuff modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    Atk,
    Armor,
    Speed,
    Initiative,
    Dodge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageEffect {
    pub value: f32,
    pub damage_type: DamageType,
    /// Coefficient of the caster's (modified) `atk` added to `value`.
    pub attack_scaling: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealEffect {
    pub value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatModEffect {
    pub stat: StatKind,
    pub value: Option<f32>,
    pub percentage: Option<f32>,
    pub duration: u32,
    pub stackable: bool,
    pub max_stacks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StunEffect {
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TauntEffect {
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummonEffect {
    pub unit_template_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldEffect {
    pub amount: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotEffect {
    pub value: f32,
    pub duration: u32,
    pub damage_type: DamageType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotEffect {
    pub value: f32,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanseEffect;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispelEffect;

/// Tagged variant over the effect kinds an ability can compose.
/// Targeting and application both dispatch on this tag instead of an
/// inheritance tree (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AbilityEffect {
    Damage(DamageEffect),
    Heal(HealEffect),
    Buff(StatModEffect),
    Debuff(StatModEffect),
    Stun(StunEffect),
    Taunt(TauntEffect),
    Summon(SummonEffect),
    Shield(ShieldEffect),
    Dot(DotEffect),
    Hot(HotEffect),
    Cleanse(CleanseEffect),
    Dispel(DispelEffect),
}

/// Who an ability's targeting step may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    SelfTarget,
    Ally,
    Enemy,
    Area,
    AllEnemies,
    AllAllies,
    RandomEnemy,
    RandomAlly,
    LowestHpAlly,
    LowestHpEnemy,
}

/// When a passive ability's trigger condition is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassiveTrigger {
    /// Checked once at the start of the owner's turn, subject to
    /// `internal_cooldown`.
    TurnStart,
    /// Checked when the owner's HP fraction first drops at/under
    /// `trigger_threshold`.
    HpBelow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ability {
    Active {
        id: String,
        cooldown: u32,
        range: u32,
        target_type: TargetType,
        area_size: Option<u32>,
        usable_while_stunned: bool,
        effects: Vec<AbilityEffect>,
    },
    Passive {
        id: String,
        trigger: PassiveTrigger,
        trigger_threshold: Option<f32>,
        internal_cooldown: Option<u32>,
        max_triggers: Option<u32>,
        effects: Vec<AbilityEffect>,
    },
}

impl Ability {
    pub fn id(&self) -> &str {
        match self {
            Ability::Active { id, .. } => id,
            Ability::Passive { id, .. } => id,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Ability::Active { .. })
    }
}

fn all_abilities() -> Vec<Ability> {
    vec![
        Ability::Active {
            id: "taunt_shout".into(),
            cooldown: 4,
            range: 0,
            target_type: TargetType::SelfTarget,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Taunt(TauntEffect { duration: 2 })],
        },
        Ability::Active {
            id: "shield_wall".into(),
            cooldown: 5,
            range: 0,
            target_type: TargetType::SelfTarget,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Shield(ShieldEffect { amount: 25.0 })],
        },
        Ability::Active {
            id: "shield_bash".into(),
            cooldown: 4,
            range: 1,
            target_type: TargetType::Enemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![
                AbilityEffect::Damage(DamageEffect { value: 2.0, damage_type: DamageType::Physical, attack_scaling: Some(0.3) }),
                AbilityEffect::Stun(StunEffect { duration: 1 }),
            ],
        },
        Ability::Active {
            id: "fortify".into(),
            cooldown: 6,
            range: 0,
            target_type: TargetType::SelfTarget,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Buff(StatModEffect {
                stat: StatKind::Armor,
                value: Some(4.0),
                percentage: None,
                duration: 3,
                stackable: false,
                max_stacks: 1,
            })],
        },
        Ability::Active {
            id: "assassinate".into(),
            cooldown: 3,
            range: 1,
            target_type: TargetType::LowestHpEnemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Damage(DamageEffect {
                value: 4.0,
                damage_type: DamageType::Physical,
                attack_scaling: Some(1.1),
            })],
        },
        Ability::Active {
            id: "venom_strike".into(),
            cooldown: 3,
            range: 1,
            target_type: TargetType::Enemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![
                AbilityEffect::Damage(DamageEffect { value: 1.0, damage_type: DamageType::Physical, attack_scaling: Some(0.4) }),
                AbilityEffect::Dot(DotEffect { value: 3.0, duration: 3, damage_type: DamageType::Physical }),
            ],
        },
        Ability::Active {
            id: "battle_fury".into(),
            cooldown: 5,
            range: 0,
            target_type: TargetType::SelfTarget,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Buff(StatModEffect {
                stat: StatKind::Atk,
                value: None,
                percentage: Some(0.3),
                duration: 3,
                stackable: true,
                max_stacks: 2,
            })],
        },
        Ability::Active {
            id: "fire_nova".into(),
            cooldown: 4,
            range: 4,
            target_type: TargetType::AllEnemies,
            area_size: Some(2),
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Damage(DamageEffect {
                value: 6.0,
                damage_type: DamageType::Magical,
                attack_scaling: Some(0.6),
            })],
        },
        Ability::Active {
            id: "summon_elemental".into(),
            cooldown: 8,
            range: 0,
            target_type: TargetType::SelfTarget,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Summon(SummonEffect {
                unit_template_id: "spirit_elemental".into(),
            })],
        },
        Ability::Active {
            id: "mending_light".into(),
            cooldown: 2,
            range: 4,
            target_type: TargetType::LowestHpAlly,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![
                AbilityEffect::Heal(HealEffect { value: 5.0 }),
                AbilityEffect::Hot(HotEffect { value: 2.0, duration: 2 }),
            ],
        },
        Ability::Active {
            id: "cleansing_light".into(),
            cooldown: 3,
            range: 4,
            target_type: TargetType::LowestHpAlly,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Cleanse(CleanseEffect)],
        },
        Ability::Active {
            id: "rallying_song".into(),
            cooldown: 4,
            range: 5,
            target_type: TargetType::AllAllies,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Buff(StatModEffect {
                stat: StatKind::Atk,
                value: Some(2.0),
                percentage: None,
                duration: 2,
                stackable: false,
                max_stacks: 1,
            })],
        },
        Ability::Active {
            id: "dispel_song".into(),
            cooldown: 4,
            range: 5,
            target_type: TargetType::RandomEnemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Dispel(DispelEffect)],
        },
        Ability::Passive {
            id: "inspire".into(),
            trigger: PassiveTrigger::TurnStart,
            trigger_threshold: None,
            internal_cooldown: Some(3),
            max_triggers: None,
            effects: vec![AbilityEffect::Hot(HotEffect { value: 1.0, duration: 1 })],
        },
        Ability::Active {
            id: "piercing_shot".into(),
            cooldown: 2,
            range: 3,
            target_type: TargetType::Enemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![AbilityEffect::Damage(DamageEffect {
                value: 3.0,
                damage_type: DamageType::Physical,
                attack_scaling: Some(0.8),
            })],
        },
        Ability::Active {
            id: "frost_bolt".into(),
            cooldown: 3,
            range: 3,
            target_type: TargetType::Enemy,
            area_size: None,
            usable_while_stunned: false,
            effects: vec![
                AbilityEffect::Damage(DamageEffect { value: 4.0, damage_type: DamageType::Magical, attack_scaling: Some(0.7) }),
                AbilityEffect::Debuff(StatModEffect {
                    stat: StatKind::Speed,
                    value: None,
                    percentage: Some(-0.4),
                    duration: 2,
                    stackable: false,
                    max_stacks: 1,
                }),
            ],
        },
    ]
}

fn catalog() -> &'static HashMap<String, Ability> {
    static CATALOG: OnceLock<HashMap<String, Ability>> = OnceLock::new();
    CATALOG.get_or_init(|| all_abilities().into_iter().map(|a| (a.id().to_string(), a)).collect())
}

/// Look up an ability by id. Returns `None` for an unknown id rather than
/// panicking — catalog integrity (every template's ability ids resolve) is
/// checked once at unit-catalog construction time, not on every lookup.
pub fn get(id: &str) -> Option<&'static Ability> {
    catalog().get(id)
}
