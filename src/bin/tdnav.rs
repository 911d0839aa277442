//! tdnav CLI - Continuous-time TD learning of place-cell value maps
//!
//! This CLI provides a unified interface for:
//! - Training a value map and its gradient-ascent navigation policy
//! - Evaluating a trained value map without further learning

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tdnav")]
#[command(version, about = "TD learning of value maps for spatial navigation", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a value map over a fresh scene
    Train(Box<tdnav::cli::commands::train::TrainArgs>),

    /// Evaluate a saved value map with learning disabled
    Evaluate(tdnav::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tdnav::cli::logging::init(&cli.log_level)?;

    match cli.command {
        Commands::Train(args) => tdnav::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => tdnav::cli::commands::evaluate::execute(args),
    }
}
