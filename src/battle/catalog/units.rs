//! Unit Catalog (C3)
//!
//! Static table of unit templates, initialized once and read-only
//! thereafter, keyed by a string id instead of a closed `CharacterClass`
//! enum, since unit ids are open catalog data rather than a fixed set of
//! classes.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A unit's combat archetype. Used by AI and, in the `ROGUELIKE`/`TACTICAL`
/// mechanics presets, by handlers such as `engagement` and `flanking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Tank,
    MeleeDps,
    RangedDps,
    Mage,
    Support,
    Control,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: f32,
    pub atk: f32,
    pub atk_count: u32,
    pub armor: f32,
    pub speed: u32,
    pub initiative: u32,
    pub dodge: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub cost: u32,
    pub stats: BaseStats,
    pub range: u32,
    pub ability_ids: Vec<String>,
}

fn all_templates() -> Vec<UnitTemplate> {
    vec![
        UnitTemplate {
            id: "guardian".into(),
            name: "Guardian".into(),
            role: Role::Tank,
            cost: 4,
            stats: BaseStats { hp: 140.0, atk: 8.0, atk_count: 1, armor: 6.0, speed: 2, initiative: 3, dodge: 5 },
            range: 1,
            ability_ids: vec!["taunt_shout".into(), "shield_wall".into()],
        },
        UnitTemplate {
            id: "knight".into(),
            name: "Knight".into(),
            role: Role::Tank,
            cost: 4,
            stats: BaseStats { hp: 130.0, atk: 9.0, atk_count: 1, armor: 5.0, speed: 3, initiative: 4, dodge: 5 },
            range: 1,
            ability_ids: vec!["shield_bash".into(), "fortify".into()],
        },
        UnitTemplate {
            id: "assassin".into(),
            name: "Assassin".into(),
            role: Role::MeleeDps,
            cost: 5,
            stats: BaseStats { hp: 80.0, atk: 14.0, atk_count: 1, armor: 2.0, speed: 5, initiative: 10, dodge: 15 },
            range: 1,
            ability_ids: vec!["assassinate".into()],
        },
        UnitTemplate {
            id: "rogue".into(),
            name: "Rogue".into(),
            role: Role::MeleeDps,
            cost: 4,
            stats: BaseStats { hp: 85.0, atk: 12.0, atk_count: 1, armor: 2.0, speed: 4, initiative: 8, dodge: 12 },
            range: 1,
            ability_ids: vec!["venom_strike".into()],
        },
        UnitTemplate {
            id: "berserker".into(),
            name: "Berserker".into(),
            role: Role::MeleeDps,
            cost: 5,
            stats: BaseStats { hp: 110.0, atk: 13.0, atk_count: 2, armor: 3.0, speed: 4, initiative: 6, dodge: 8 },
            range: 1,
            ability_ids: vec!["battle_fury".into()],
        },
        UnitTemplate {
            id: "elementalist".into(),
            name: "Elementalist".into(),
            role: Role::Mage,
            cost: 5,
            stats: BaseStats { hp: 70.0, atk: 11.0, atk_count: 1, armor: 1.0, speed: 3, initiative: 7, dodge: 8 },
            range: 4,
            ability_ids: vec!["fire_nova".into(), "summon_elemental".into()],
        },
        UnitTemplate {
            id: "mage".into(),
            name: "Mage".into(),
            role: Role::Mage,
            cost: 4,
            stats: BaseStats { hp: 65.0, atk: 10.0, atk_count: 1, armor: 1.0, speed: 3, initiative: 7, dodge: 8 },
            range: 3,
            ability_ids: vec!["frost_bolt".into()],
        },
        UnitTemplate {
            id: "priest".into(),
            name: "Priest".into(),
            role: Role::Support,
            cost: 4,
            stats: BaseStats { hp: 75.0, atk: 5.0, atk_count: 1, armor: 2.0, speed: 3, initiative: 6, dodge: 6 },
            range: 4,
            ability_ids: vec!["mending_light".into(), "cleansing_light".into()],
        },
        UnitTemplate {
            id: "bard".into(),
            name: "Bard".into(),
            role: Role::Support,
            cost: 3,
            stats: BaseStats { hp: 70.0, atk: 4.0, atk_count: 1, armor: 1.0, speed: 3, initiative: 5, dodge: 6 },
            range: 5,
            ability_ids: vec!["rallying_song".into(), "dispel_song".into(), "inspire".into()],
        },
        UnitTemplate {
            id: "archer".into(),
            name: "Archer".into(),
            role: Role::RangedDps,
            cost: 4,
            stats: BaseStats { hp: 75.0, atk: 12.0, atk_count: 1, armor: 2.0, speed: 3, initiative: 7, dodge: 10 },
            range: 3,
            ability_ids: vec!["piercing_shot".into()],
        },
        UnitTemplate {
            id: "spirit_elemental".into(),
            name: "Spirit Elemental".into(),
            role: Role::MeleeDps,
            cost: 1,
            stats: BaseStats { hp: 30.0, atk: 6.0, atk_count: 1, armor: 0.0, speed: 3, initiative: 5, dodge: 5 },
            range: 1,
            ability_ids: vec![],
        },
    ]
}

fn catalog() -> &'static HashMap<String, UnitTemplate> {
    static CATALOG: OnceLock<HashMap<String, UnitTemplate>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let templates: HashMap<String, UnitTemplate> =
            all_templates().into_iter().map(|t| (t.id.clone(), t)).collect();
        for template in templates.values() {
            for ability_id in &template.ability_ids {
                assert!(
                    super::abilities::get(ability_id).is_some(),
                    "unit template '{}' references unknown ability '{}'",
                    template.id,
                    ability_id
                );
            }
        }
        templates
    })
}

/// Look up a unit template by id.
pub fn get(id: &str) -> Option<&'static UnitTemplate> {
    catalog().get(id)
}

#[cfg(test)]
pub fn test_template() -> UnitTemplate {
    get("guardian").expect("catalog seeded with guardian").clone()
}
