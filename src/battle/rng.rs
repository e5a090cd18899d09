//! Deterministic RNG
//!
//! A single seeded stream per battle. `rand`'s `StdRng` is explicitly *not*
//! pinned to a stable algorithm across crate versions, which would silently
//! break reproducibility across runs, platforms, and re-entries. `Pcg64Mcg`
//! is a small counter-based generator with a documented, stable output
//! stream, so it is used as the concrete backing RNG while still going
//! through `rand`'s `Rng`/`SeedableRng` traits the rest of the stack
//! already depends on.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::state::BattleUnit;

/// The battle's seeded random stream, plus the facilities to fork a
/// sub-stream for a single unit's turn without disturbing the parent
/// stream's future draws.
#[derive(Clone)]
pub struct BattleRng {
    inner: Pcg64Mcg,
}

impl BattleRng {
    /// Seed the root stream for a battle from the public `u32` seed.
    pub fn new(seed: u32) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed as u64),
        }
    }

    /// Integer in `[low, high)`. Panics if `high <= low`, matching
    /// `rand::Rng::gen_range`'s contract.
    pub fn range(&mut self, low: u32, high: u32) -> u32 {
        self.inner.gen_range(low..high)
    }

    /// `true` with probability `p` (0.0..=1.0).
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Pick an index into `0..len` uniformly. Returns `None` for `len == 0`.
    pub fn uniform_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Derive a per-turn sub-stream from `(battle seed, round, acting unit,
    /// its position)`. The sub-stream is independent of the parent's draw
    /// count, so turn order or prior draws elsewhere in the round cannot
    /// perturb it.
    pub fn fork_for_turn(&self, seed: u32, round: u32, unit: &BattleUnit) -> Self {
        let mixed = fnv1a64_turn_seed(seed, round, &unit.instance_id, unit.position.x, unit.position.y);
        Self {
            inner: Pcg64Mcg::seed_from_u64(mixed),
        }
    }
}

/// FNV-1a over the turn-seed inputs. Written by hand rather than reaching
/// for `std::hash::Hasher` (`DefaultHasher`'s algorithm is not part of its
/// stability guarantee) so the mixing is pinned and portable.
fn fnv1a64_turn_seed(seed: u32, round: u32, instance_id: &str, x: u8, y: u8) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    let mut mix = |byte: u8| {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    };

    for b in seed.to_le_bytes() {
        mix(b);
    }
    for b in round.to_le_bytes() {
        mix(b);
    }
    for b in instance_id.as_bytes() {
        mix(*b);
    }
    mix(x);
    mix(y);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::grid::Position;
    use crate::battle::state::{BattleUnit, Team};
    use std::sync::Arc;

    fn dummy_unit(id: &str) -> BattleUnit {
        BattleUnit::new_for_test(id, Team::Player, Position::new(0, 0).unwrap(), Arc::new(crate::battle::catalog::units::test_template()))
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = BattleRng::new(42);
        let mut b = BattleRng::new(42);
        for _ in 0..50 {
            assert_eq!(a.range(0, 1000), b.range(0, 1000));
        }
    }

    #[test]
    fn different_seed_diverges() {
        let mut a = BattleRng::new(1);
        let mut b = BattleRng::new(2);
        let seq_a: Vec<u32> = (0..20).map(|_| a.range(0, 1_000_000)).collect();
        let seq_b: Vec<u32> = (0..20).map(|_| b.range(0, 1_000_000)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn fork_is_deterministic_and_order_independent() {
        let root = BattleRng::new(7);
        let unit = dummy_unit("player_guardian_0");
        let mut fork1 = root.fork_for_turn(7, 3, &unit);
        let mut fork2 = root.fork_for_turn(7, 3, &unit);
        assert_eq!(fork1.range(0, 999), fork2.range(0, 999));

        // Drawing from the parent before forking must not change the fork's seed.
        let mut root2 = root.clone();
        let _ = root2.range(0, 10);
        let mut fork3 = root2.fork_for_turn(7, 3, &unit);
        let mut fork4 = root.fork_for_turn(7, 3, &unit);
        assert_eq!(fork3.range(0, 999), fork4.range(0, 999));
    }
}
