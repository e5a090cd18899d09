//! GridClash - Deterministic Grid Autobattler Simulator
//!
//! Headless CLI entrypoint: load a JSON battle configuration, run it through
//! `battle::simulate`, and print (or save) the result.

use gridclash::service::{cli, runner};

fn main() {
    tracing_subscriber::fmt::init();

    let args = cli::parse_args();

    match runner::run_from_file(&args.config) {
        Ok(result) => {
            if let Some(output) = &args.output {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(output, json) {
                            tracing::error!("failed to write output file: {e}");
                            std::process::exit(1);
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize result: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        tracing::error!("failed to serialize result: {e}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!("battle failed: {e}");
            std::process::exit(1);
        }
    }
}
