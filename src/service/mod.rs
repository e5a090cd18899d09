//! The external layer: CLI argument parsing and the JSON headless runner.
//! Everything here is I/O and input adaptation; none of it participates in
//! the battle core's determinism contract.

pub mod cli;
pub mod config;
pub mod runner;
