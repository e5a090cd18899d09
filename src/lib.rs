//! GridClash - Deterministic Grid Autobattler Simulator
//!
//! A pure, seeded battle simulator core: given two rosters and a seed,
//! `battle::simulate` returns a byte-identical `BattleResult` on every run.
//! This library exposes the core for embedding, plus a thin headless
//! service layer (`service`) for running battles from JSON configuration.

pub mod battle;
pub mod service;

pub use battle::{simulate, BattleError, BattleResult, MechanicId, MechanicsConfig, MechanicsPreset, MechanicsRecord, Outcome};
