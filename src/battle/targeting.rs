//! Targeting Resolver
//!
//! Resolves an ability's `TargetType` against the current board: team and
//! range filters first, taunt precedence second (any taunting unit among the
//! in-range candidates forces `Enemy`/`RandomEnemy`/`LowestHpEnemy` onto the
//! taunting unit(s), unless no taunting unit is in range), then the
//! type-specific selection policy. Grounded on the target-acquisition
//! helpers common to the pack's combat AI modules, adapted from continuous-range
//! checks to grid Chebyshev distance.

use super::catalog::abilities::TargetType;
use super::grid::Position;
use super::rng::BattleRng;
use super::state::{BattleState, BattleUnit, Team};

/// Candidates for an ability cast from `caster`, already filtered by team
/// and range, with taunt precedence applied where relevant.
pub fn resolve_targets(
    state: &BattleState,
    caster: &BattleUnit,
    target_type: TargetType,
    range: u32,
    rng: &mut BattleRng,
) -> Vec<String> {
    match target_type {
        TargetType::SelfTarget => vec![caster.instance_id.clone()],

        TargetType::Ally => single_nearest(state, caster, caster.team, range, false),
        TargetType::Enemy => single_nearest(state, caster, caster.team.opponent(), range, true),

        TargetType::Area => units_in_range(state, caster, caster.team.opponent(), range)
            .into_iter()
            .map(|u| u.instance_id.clone())
            .collect(),
        TargetType::AllEnemies => units_in_range(state, caster, caster.team.opponent(), range)
            .into_iter()
            .map(|u| u.instance_id.clone())
            .collect(),
        TargetType::AllAllies => state
            .living_on_team(caster.team)
            .filter(|u| caster.position.distance(&u.position) <= range)
            .map(|u| u.instance_id.clone())
            .collect(),

        TargetType::RandomEnemy => random_in_range(state, caster, caster.team.opponent(), range, rng, true),
        TargetType::RandomAlly => random_in_range(state, caster, caster.team, range, rng, false),

        TargetType::LowestHpAlly => lowest_hp_in_range(state, caster, caster.team, range, false),
        TargetType::LowestHpEnemy => lowest_hp_in_range(state, caster, caster.team.opponent(), range, true),
    }
}

fn units_in_range<'a>(state: &'a BattleState, caster: &BattleUnit, team: Team, range: u32) -> Vec<&'a BattleUnit> {
    state.living_on_team(team).filter(|u| caster.position.distance(&u.position) <= range).collect()
}

/// If `apply_taunt` and any unit in `in_range` currently has taunt active,
/// candidates collapse to just the taunting unit(s) among `in_range`. Must
/// be called with a pool already filtered by range: taunt precedence is
/// evaluated against enemies actually in range, not the whole living pool,
/// so a taunter sitting out of range never blanks out an otherwise-valid
/// in-range non-taunter.
fn taunting_candidates<'a>(in_range: Vec<&'a BattleUnit>, apply_taunt: bool) -> Vec<&'a BattleUnit> {
    if !apply_taunt {
        return in_range;
    }
    let taunters: Vec<&BattleUnit> = in_range.iter().copied().filter(|u| u.has_taunt).collect();
    if taunters.is_empty() {
        in_range
    } else {
        taunters
    }
}

fn single_nearest(state: &BattleState, caster: &BattleUnit, team: Team, range: u32, apply_taunt: bool) -> Vec<String> {
    let in_range = units_in_range(state, caster, team, range);
    let candidates = taunting_candidates(in_range, apply_taunt);
    let best = candidates.into_iter().min_by_key(|u| (caster.position.distance(&u.position), u.instance_id.clone()));
    best.map(|u| vec![u.instance_id.clone()]).unwrap_or_default()
}

fn random_in_range(
    state: &BattleState,
    caster: &BattleUnit,
    team: Team,
    range: u32,
    rng: &mut BattleRng,
    apply_taunt: bool,
) -> Vec<String> {
    let in_range = units_in_range(state, caster, team, range);
    let mut candidates = taunting_candidates(in_range, apply_taunt);
    candidates.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
    match rng.uniform_index(candidates.len()) {
        Some(i) => vec![candidates[i].instance_id.clone()],
        None => Vec::new(),
    }
}

/// Minimum *current* HP among in-range candidates (not HP fraction), tied
/// first by lower `(y, x)`, then by ascending instance id.
fn lowest_hp_in_range(state: &BattleState, caster: &BattleUnit, team: Team, range: u32, apply_taunt: bool) -> Vec<String> {
    let in_range = units_in_range(state, caster, team, range);
    let candidates = taunting_candidates(in_range, apply_taunt);
    let best = candidates.into_iter().min_by(|a, b| {
        a.current_hp
            .partial_cmp(&b.current_hp)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.position.tiebreak_key().cmp(&b.position.tiebreak_key()))
            .then_with(|| a.instance_id.cmp(&b.instance_id))
    });
    best.map(|u| vec![u.instance_id.clone()]).unwrap_or_default()
}

/// The living enemy with the lowest current HP within `range` of `caster`,
/// taunt-aware, independent of any ability's `TargetType`. Used by the AI
/// decider (C8) for its in-range basic-attack target.
pub fn lowest_hp_enemy_in_range(state: &BattleState, caster: &BattleUnit, range: u32) -> Option<String> {
    lowest_hp_in_range(state, caster, caster.team.opponent(), range, true).into_iter().next()
}

/// Nearest living enemy to `position` among the whole opposing roster (no
/// range limit — used to pick a movement target, which isn't constrained by
/// any ability's range), taunt-aware.
pub fn nearest_enemy<'a>(state: &'a BattleState, team: Team, position: Position) -> Option<&'a BattleUnit> {
    let all: Vec<&BattleUnit> = state.living_on_team(team.opponent()).collect();
    let pool = taunting_candidates(all, true);
    pool.into_iter().min_by_key(|u| (position.distance(&u.position), u.position.tiebreak_key(), u.instance_id.clone()))
}

/// The in-bounds, unoccupied cell adjacent to `target` that is nearest to
/// `from`, tie-broken by lower `(y, x)`. Used as the pathfinding goal for a
/// movement-only AI step: the mover must end up next to the target, never
/// on the target's own occupied cell.
pub fn adjacent_goal(state: &BattleState, from: Position, target: Position) -> Option<Position> {
    let occupied = state.occupied_positions();
    target
        .neighbors()
        .into_iter()
        .filter(|p| !occupied.contains_key(p) || *p == from)
        .min_by_key(|p| (from.distance(p), p.tiebreak_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::catalog::units;
    use std::sync::Arc;

    fn make_unit(id: &str, team: Team, pos: (i32, i32)) -> BattleUnit {
        BattleUnit::new_for_test(id, team, Position::new(pos.0, pos.1).unwrap(), Arc::new(units::test_template()))
    }

    #[test]
    fn taunt_forces_single_target_selection() {
        let mut state = BattleState::new(
            vec![
                make_unit("player_guardian_0", Team::Player, (0, 0)),
                make_unit("bot_guardian_0", Team::Bot, (0, 5)),
                make_unit("bot_guardian_1", Team::Bot, (1, 5)),
            ],
            1,
        );
        state.units[1].has_taunt = true;
        let caster = state.units[0].clone();
        let targets = single_nearest(&state, &caster, Team::Bot, 99, true);
        assert_eq!(targets, vec!["bot_guardian_0".to_string()]);
    }

    #[test]
    fn out_of_range_taunter_does_not_blank_in_range_candidates() {
        let mut state = BattleState::new(
            vec![
                make_unit("player_guardian_0", Team::Player, (0, 0)),
                make_unit("bot_guardian_0", Team::Bot, (1, 0)),
                make_unit("bot_guardian_1", Team::Bot, (7, 9)),
            ],
            1,
        );
        state.units[2].has_taunt = true;
        let caster = state.units[0].clone();
        let targets = single_nearest(&state, &caster, Team::Bot, 2, true);
        assert_eq!(targets, vec!["bot_guardian_0".to_string()], "the out-of-range taunter must not collapse candidates to empty");
    }

    #[test]
    fn lowest_hp_breaks_ties_by_instance_id() {
        let mut state = BattleState::new(
            vec![
                make_unit("player_guardian_0", Team::Player, (0, 0)),
                make_unit("bot_guardian_0", Team::Bot, (0, 1)),
                make_unit("bot_guardian_1", Team::Bot, (0, 2)),
            ],
            1,
        );
        state.units[1].current_hp = 50.0;
        state.units[2].current_hp = 50.0;
        let caster = state.units[0].clone();
        let targets = lowest_hp_in_range(&state, &caster, Team::Bot, 99, true);
        assert_eq!(targets, vec!["bot_guardian_0".to_string()]);
    }

    #[test]
    fn lowest_hp_uses_absolute_hp_not_fraction() {
        let mut state = BattleState::new(
            vec![
                make_unit("player_guardian_0", Team::Player, (0, 0)),
                make_unit("bot_guardian_0", Team::Bot, (0, 1)),
                make_unit("bot_guardian_1", Team::Bot, (0, 2)),
            ],
            1,
        );
        // bot_guardian_0 has a far lower HP fraction but a higher absolute HP;
        // the absolute-HP policy must still prefer bot_guardian_1.
        state.units[1].max_hp = 1000.0;
        state.units[1].current_hp = 40.0;
        state.units[2].max_hp = 100.0;
        state.units[2].current_hp = 30.0;
        let caster = state.units[0].clone();
        let targets = lowest_hp_in_range(&state, &caster, Team::Bot, 99, true);
        assert_eq!(targets, vec!["bot_guardian_1".to_string()]);
    }

    #[test]
    fn out_of_range_candidates_are_excluded() {
        let state = BattleState::new(
            vec![make_unit("player_guardian_0", Team::Player, (0, 0)), make_unit("bot_guardian_0", Team::Bot, (7, 9))],
            1,
        );
        let caster = state.units[0].clone();
        let targets = single_nearest(&state, &caster, Team::Bot, 1, true);
        assert!(targets.is_empty());
    }

    #[test]
    fn adjacent_goal_never_lands_on_the_target_cell() {
        let state = BattleState::new(
            vec![make_unit("player_guardian_0", Team::Player, (0, 0)), make_unit("bot_guardian_0", Team::Bot, (3, 0))],
            1,
        );
        let from = Position::new(0, 0).unwrap();
        let target = Position::new(3, 0).unwrap();
        let goal = adjacent_goal(&state, from, target).unwrap();
        assert_ne!(goal, target);
        assert_eq!(goal.distance(&target), 1);
    }
}
