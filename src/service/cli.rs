//! Command-line interface, a `clap::Parser` trimmed to the one mode this
//! crate has: running a battle configuration headlessly and printing/
//! saving the result.

use std::path::PathBuf;

use clap::Parser;

/// Deterministic grid autobattler combat simulator.
#[derive(Parser, Debug)]
#[command(name = "gridclash")]
#[command(about = "Deterministic grid autobattler combat simulator")]
#[command(version)]
pub struct Args {
    /// JSON battle configuration file to run.
    #[arg(value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Override the config file's output path for the result JSON.
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
