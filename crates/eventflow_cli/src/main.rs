// SPDX-License-Identifier: MIT OR Apache-2.0
//! `EventFlow` command line runner.
//!
//! Loads a controller description (RON) and either validates it, prints the
//! description derived from the compiled graph, or simulates a number of
//! ticks while printing the state of every layer.

mod runner;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventflow_graph::clips::LogClip;
use eventflow_graph::{ClipRegistry, Controller, ControllerDescription};
use runner::{OutputFormat, RunOptions, Simulation};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "eventflow", version, about = "Run layered event-node state machines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a description and print a summary
    Check {
        /// Description file (RON)
        file: PathBuf,
    },
    /// Print the description derived from the compiled graph
    Describe {
        /// Description file (RON)
        file: PathBuf,
    },
    /// Start the controller and run ticks
    Run {
        /// Description file (RON)
        file: PathBuf,
        /// Number of ticks to run
        #[arg(short, long, default_value_t = 10)]
        ticks: u64,
        /// Seconds per tick, overriding the description
        #[arg(long)]
        step: Option<f32>,
        /// Set a parameter before starting, as NAME=VALUE
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,
        /// Raise a trigger before a tick, as NAME@TICK
        #[arg(long = "trigger", value_name = "NAME@TICK")]
        triggers: Vec<String>,
        /// Print one JSON object per tick
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check { file } => {
            let controller = compile(&file)?;
            println!(
                "{}: {} layers, {} nodes, {} parameters",
                controller.label(),
                controller.layers().len(),
                controller.layers().iter().map(|l| l.nodes().len()).sum::<usize>(),
                controller.params().len()
            );
            for layer in controller.layers() {
                let entry = layer
                    .entry()
                    .and_then(|index| layer.node(index))
                    .map_or("(none)", |n| n.name.as_str());
                println!("  {}: {} nodes, entry {}", layer.name(), layer.nodes().len(), entry);
            }
        }
        Command::Describe { file } => {
            let controller = compile(&file)?;
            println!("{}", controller.describe().to_ron()?);
        }
        Command::Run {
            file,
            ticks,
            step,
            assignments,
            triggers,
            json,
        } => {
            let mut controller = compile(&file)?;
            if let Some(step) = step {
                anyhow::ensure!(step >= 0.0, "--step must not be negative");
            }
            let options = RunOptions {
                ticks,
                step,
                format: if json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Text
                },
            };
            runner::apply_assignments(&mut controller, &assignments)?;
            let mut simulation = Simulation::new(controller, &triggers)?;
            let stdout = std::io::stdout();
            simulation.run(&options, &mut stdout.lock())?;
        }
    }
    Ok(())
}

/// Clips available to descriptions by name
fn builtin_registry() -> ClipRegistry {
    let mut registry = ClipRegistry::new();
    registry.register("log", || LogClip);
    registry
}

fn compile(path: &Path) -> Result<Controller> {
    let description = ControllerDescription::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let controller = Controller::compile(&description, &builtin_registry())
        .with_context(|| format!("compiling {}", path.display()))?;
    tracing::debug!("Compiled '{}' from {}", controller.label(), path.display());
    Ok(controller)
}
