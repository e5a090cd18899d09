//! The deterministic battle simulator core. Everything under this module is
//! a pure function of its inputs: no I/O, no clocks, no thread spawning, no
//! global mutable state beyond the read-only catalogs.

pub mod ai;
pub mod catalog;
pub mod error;
pub mod events;
pub mod executor;
pub mod grid;
pub mod mechanics;
pub mod pathfinder;
pub mod queue;
pub mod rng;
pub mod simulate;
pub mod state;
pub mod status;
pub mod targeting;

pub use error::BattleError;
pub use simulate::{simulate, BattleResult, MechanicId, MechanicsConfig, MechanicsPreset, MechanicsRecord, Outcome};
pub use state::Team;
