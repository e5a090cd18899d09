//! Turn Queue
//!
//! Orders the living roster for a round: initiative descending, speed
//! descending, instance id ascending as the final deterministic tie-break.
//! Recomputed fresh every round rather than maintained incrementally, so a
//! mid-round death or summon is picked up automatically by the next round's
//! build.

use super::state::BattleState;
use super::status::modified_stats;

/// Build this round's turn order as a list of living unit instance ids.
pub fn build_turn_order(state: &BattleState) -> Vec<String> {
    let mut entries: Vec<(u32, u32, String)> = state
        .units
        .iter()
        .filter(|u| u.alive)
        .map(|u| {
            let stats = modified_stats(u);
            (stats.initiative, stats.speed, u.instance_id.clone())
        })
        .collect();

    entries.sort_by(|a, b| {
        b.0.cmp(&a.0) // initiative desc
            .then_with(|| b.1.cmp(&a.1)) // speed desc
            .then_with(|| a.2.cmp(&b.2)) // instance id asc
    });

    entries.into_iter().map(|(_, _, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::catalog::units;
    use crate::battle::grid::Position;
    use crate::battle::state::{BattleUnit, Team};
    use std::sync::Arc;

    #[test]
    fn orders_by_initiative_then_speed_then_id() {
        let template = Arc::new(units::test_template());
        let mut a = BattleUnit::new_for_test("player_b", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        let mut b = BattleUnit::new_for_test("player_a", Team::Player, Position::new(1, 0).unwrap(), template.clone());
        let c = BattleUnit::new_for_test("player_c", Team::Player, Position::new(2, 0).unwrap(), template);
        // Force identical initiative/speed on a and b so id breaks the tie.
        a.status_effects.clear();
        b.status_effects.clear();
        let state = BattleState::new(vec![a, b, c], 1);
        let order = build_turn_order(&state);
        assert_eq!(order[0], "player_a");
        assert_eq!(order[1], "player_b");
        assert_eq!(order[2], "player_c");
    }

    #[test]
    fn dead_units_are_excluded() {
        let template = Arc::new(units::test_template());
        let mut dead = BattleUnit::new_for_test("player_dead", Team::Player, Position::new(0, 0).unwrap(), template.clone());
        dead.alive = false;
        let alive = BattleUnit::new_for_test("player_alive", Team::Player, Position::new(1, 0).unwrap(), template);
        let state = BattleState::new(vec![dead, alive], 1);
        let order = build_turn_order(&state);
        assert_eq!(order, vec!["player_alive".to_string()]);
    }
}
