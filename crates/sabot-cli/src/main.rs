//! Sabot CLI - adversarial multi-agent experiments and their evaluation
//!
//! # Usage
//!
//! ```bash
//! # Run the corrupted arm of an experiment
//! sabot run --environment travel_planning --adversarial-agent RECOMMENDER_AGENT \
//!     --n-runs 5 --base-seed 1 --id corrupted
//!
//! # Legacy single-file success rate
//! sabot eval travel_planning results/run.json
//!
//! # Counterfactual effect between reference and intervention arms
//! sabot eval travel_planning --ref-paths ref.json --int-paths int.json --pairwise
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{eval, run};

/// Sabot - measuring how one corrupted agent action changes a
/// multi-agent system's outcome.
#[derive(Parser)]
#[command(
    name = "sabot",
    version,
    about = "Adversarial multi-agent experiments and counterfactual evaluation"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one experiment arm and record trajectories
    #[command(name = "run")]
    Run(run::RunArgs),

    /// Evaluate recorded trajectories
    #[command(name = "eval")]
    Eval(eval::EvalArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Eval(args) => eval::run(args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}
