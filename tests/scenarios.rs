//! Six concrete end-to-end battle scenarios exercising victory, draw,
//! rejection, and taunt-redirection outcomes.

use gridclash::battle::simulate::{MechanicsConfig, MechanicsPreset, UnitPlacement};
use gridclash::{simulate, BattleError, Outcome};

#[test]
fn scenario_1_duel_determinism() {
    let player = vec![UnitPlacement::new("guardian", 3, 0)];
    let bot = vec![UnitPlacement::new("assassin", 3, 9)];

    let a = simulate(&player, &bot, 77777, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();
    let b = simulate(&player, &bot, 77777, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();
    let c = simulate(&player, &bot, 77777, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();

    let a_json = serde_json::to_string(&a).unwrap();
    assert_eq!(a_json, serde_json::to_string(&b).unwrap());
    assert_eq!(a_json, serde_json::to_string(&c).unwrap());
}

#[test]
fn scenario_2_out_of_bounds_rejection() {
    let player = vec![UnitPlacement::new("knight", -1, 0)];
    let bot = vec![UnitPlacement::new("rogue", 0, 9)];

    let result = simulate(&player, &bot, 12345, None);
    assert!(matches!(result, Err(BattleError::PositionOutOfBounds { x: -1, y: 0, .. })));
}

#[test]
fn scenario_3_guaranteed_player_win() {
    let player = vec![UnitPlacement::new("berserker", 2, 1), UnitPlacement::new("elementalist", 3, 1)];
    let bot = vec![UnitPlacement::new("priest", 2, 8).with_hp(5.0), UnitPlacement::new("bard", 3, 8).with_hp(5.0)];

    let result = simulate(&player, &bot, 11111, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();

    assert_eq!(result.outcome, Outcome::PlayerVictory);
    assert!(result.rounds_elapsed < 100);
}

#[test]
fn scenario_4_draw_by_timeout() {
    let player = vec![UnitPlacement::new("guardian", 0, 1).with_hp(500.0).with_armor(50.0)];
    let bot = vec![UnitPlacement::new("guardian", 0, 8).with_hp(500.0).with_armor(50.0)];

    let result = simulate(&player, &bot, 33333, None).unwrap();

    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(result.rounds_elapsed, 100);
}

#[test]
fn scenario_5_taunt_redirection() {
    use gridclash::battle::events::BattleEvent;

    let player = vec![UnitPlacement::new("archer", 2, 1)];
    let bot = vec![UnitPlacement::new("guardian", 2, 8), UnitPlacement::new("priest", 3, 8)];

    let result = simulate(&player, &bot, 88888, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();

    let redirected = result.events.iter().any(|e| match e {
        BattleEvent::Attack { round, actor_id, target_id, .. } => {
            *round >= 2 && actor_id.starts_with("player_archer") && target_id.starts_with("bot_guardian")
        }
        _ => false,
    });
    assert!(redirected, "expected at least one archer attack on the taunting guardian in round >= 2");
}

#[test]
fn scenario_6_deterministic_turn_order_by_initiative() {
    use gridclash::battle::events::BattleEvent;

    let player = vec![UnitPlacement::new("guardian", 0, 0)];
    let bot = vec![UnitPlacement::new("assassin", 0, 9)];

    let result = simulate(&player, &bot, 77777, Some(MechanicsConfig::Preset(MechanicsPreset::Mvp))).unwrap();

    let round_1_actors: Vec<&str> = result
        .events
        .iter()
        .filter(|e| e.round() == 1)
        .filter_map(|e| match e {
            BattleEvent::Attack { actor_id, .. } | BattleEvent::Move { actor_id, .. } => Some(actor_id.as_str()),
            _ => None,
        })
        .collect();

    let assassin_index = round_1_actors.iter().position(|a| a.starts_with("bot_assassin"));
    let guardian_index = round_1_actors.iter().position(|a| a.starts_with("player_guardian"));

    if let (Some(a), Some(g)) = (assassin_index, guardian_index) {
        assert!(a < g, "assassin (initiative 10) must act before guardian (initiative 3)");
    }
}
