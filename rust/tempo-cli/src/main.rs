//! tempo — educational CPU scheduling simulator.
//!
//! The binary is a thin host around the engine: it loads or synthesizes a
//! scenario, wires Ctrl-C to the engine's cancellation token, runs every
//! container and renders the timelines and statistics.

mod demos;
mod render;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use scenario::{ScenarioError, ScenarioFile};
use tempo_engine::{container::DEFAULT_TICK, run_all, CancellationToken};

#[derive(Parser)]
#[command(name = "tempo", version, about = "Educational CPU scheduling simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every container of a TOML scenario file.
    Run {
        /// Path to the scenario file.
        path: PathBuf,
        /// Emit the full reports as JSON instead of tables.
        #[arg(long)]
        json: bool,
        /// Shrink the simulated tick for a faster run.
        #[arg(long)]
        fast: bool,
    },
    /// Run a built-in demo scenario, or list them all.
    Demo {
        /// Demo name; omit to list the catalogue.
        name: Option<String>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        fast: bool,
    },
    /// Print the algorithm set and per-algorithm quanta.
    Algs,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScenarioError> {
    match cli.command {
        Command::Run { path, json, fast } => {
            let file = scenario::load(&path)?;
            execute(file, json, fast)
        }
        Command::Demo { name, json, fast } => match name {
            None => {
                demos::list();
                Ok(())
            }
            Some(name) => execute(demos::by_name(&name)?, json, fast),
        },
        Command::Algs => {
            render::print_algorithms();
            Ok(())
        }
    }
}

fn execute(file: ScenarioFile, json: bool, fast: bool) -> Result<(), ScenarioError> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            warn!("interrupt received, cancelling run");
            cancel.cancel();
        }) {
            warn!(error = %e, "could not install interrupt handler");
        }
    }

    let tick = if fast {
        Duration::from_micros(200)
    } else {
        DEFAULT_TICK
    };
    let containers = file.build(tick, &cancel)?;
    let reports = run_all(containers);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (i, report) in reports.iter().enumerate() {
            render::print_report(i, file.name.as_deref(), report);
        }
    }
    Ok(())
}
