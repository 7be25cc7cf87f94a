//! OS scheduling simulator CLI.
//!
//! `ossim [-dc] [-dm] [-rs] <config.cnf>`: at least one switch and a
//! trailing configuration file name ending in `.cnf` are required:
//! 1. **`-dc`:** Display the uploaded configuration data.
//! 2. **`-dm`:** Display the uploaded metadata op codes.
//! 3. **`-rs`:** Run the simulator.
//!
//! Error conditions are reported on stdout and the exit code is always 0;
//! a bad command line prints the usage text.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ossim_core::metadata;
use ossim_core::{ConfigData, Simulation};

#[derive(Parser, Debug)]
#[command(
    name = "ossim",
    author,
    version,
    about = "Operating-system scheduling simulator",
    long_about = "Simulates the execution of a metadata op-code program under a chosen CPU \
scheduling policy, with simulated memory and blocking I/O.\n\nExamples:\n  \
ossim -dc config.cnf\n  ossim -dm -rs config.cnf\n  ossim -rs --stats config.cnf"
)]
struct Cli {
    /// Display the uploaded configuration data.
    #[arg(long = "dc")]
    display_config: bool,

    /// Display the uploaded metadata op codes.
    #[arg(long = "dm")]
    display_metadata: bool,

    /// Run the simulator.
    #[arg(long = "rs")]
    run_sim: bool,

    /// Print end-of-run statistics as JSON (with -rs).
    #[arg(long)]
    stats: bool,

    /// Configuration file name; must end in `.cnf`.
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // The original front-end took single-dash switches; clap wants two.
    let args = normalize_legacy_switches(std::env::args().collect());
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if wants_help(&args) => {
            let _ = err.print();
            return;
        }
        Err(_) => {
            show_usage();
            return;
        }
    };

    let any_switch = cli.display_config || cli.display_metadata || cli.run_sim;
    let cnf_name = cli.config.extension().is_some_and(|ext| ext == "cnf");
    if !any_switch || !cnf_name {
        show_usage();
        return;
    }

    println!("\nSimulator Program");
    println!("=================\n");
    run(&cli);
    println!("\nSimulator Program End.\n");
}

/// Uploads the inputs and performs whatever the switches asked for. Upload
/// failures abort the run but are plain stdout reports, not exit codes.
fn run(cli: &Cli) {
    let config = match ConfigData::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            println!("\nConfig Upload Error: {err}, program aborted\n");
            return;
        }
    };

    if cli.display_config {
        println!("{config}");
    }
    if !(cli.display_metadata || cli.run_sim) {
        return;
    }

    let program = match metadata::load_program(&config.metadata_path) {
        Ok(program) => program,
        Err(err) => {
            println!("\nMetadata Upload Error: {err}, program aborted\n");
            return;
        }
    };

    if cli.display_metadata {
        print!("{}", metadata::render_program(&program));
    }
    if !cli.run_sim {
        return;
    }

    tracing::info!(config = %cli.config.display(), "starting simulation run");
    match Simulation::new(config, &program).run() {
        Ok(report) => {
            if cli.stats {
                match serde_json::to_string_pretty(&report.stats) {
                    Ok(json) => println!("{json}"),
                    Err(err) => println!("\nStatistics Report Error: {err}\n"),
                }
            }
        }
        Err(err) => println!("\nSimulation Error: {err}\n"),
    }
}

/// Maps the legacy `-dc`/`-dm`/`-rs` spellings onto clap long flags.
fn normalize_legacy_switches(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.as_str() {
            "-dc" => "--dc".to_string(),
            "-dm" => "--dm".to_string(),
            "-rs" => "--rs".to_string(),
            _ => arg,
        })
        .collect()
}

fn wants_help(args: &[String]) -> bool {
    args.iter()
        .any(|arg| arg == "--help" || arg == "-h" || arg == "--version" || arg == "-V")
}

fn show_usage() {
    println!("Command line format:");
    println!("    ossim [-dc] [-dm] [-rs] <config file name>");
    println!("    -dc [optional] displays configuration data");
    println!("    -dm [optional] displays metadata op codes");
    println!("    -rs [optional] runs the simulator");
    println!("    required config file name, ending in .cnf");
}
