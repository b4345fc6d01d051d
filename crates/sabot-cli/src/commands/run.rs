//! Run command - execute one experiment arm
//!
//! Usage:
//! ```bash
//! sabot run --environment code_generation --adversarial-agent BROWSER \
//!     --scenarios datasets/bad_acts.json --n-runs 5 --base-seed 1
//! ```

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sabot_core::{EnvironmentKind, ScenarioCatalog};
use sabot_llm::{LlmConfig, LlmProvider};
use sabot_runtime::{ExperimentConfig, ExperimentRunner};
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Model client name (contains "llama" -> Ollama, "gpt" -> OpenAI,
    /// "mock" -> scripted mock)
    #[arg(long, default_value = "llama3.1:70b")]
    model_client: String,

    /// Task environment
    #[arg(long)]
    environment: EnvironmentKind,

    /// Role to substitute with the adversarial stand-in
    #[arg(long)]
    adversarial_agent: String,

    /// Use hardened prompt variants
    #[arg(long)]
    safe: bool,

    /// Attach the guardian agent that monitors every turn
    #[arg(long)]
    guardian: bool,

    /// Optional label appended to the result filename
    #[arg(long)]
    id: Option<String>,

    /// Trajectories per scenario row
    #[arg(long, default_value_t = 1)]
    n_runs: u32,

    /// Base seed; use the same one for reference and corrupted arms
    #[arg(long, default_value_t = 0)]
    base_seed: u64,

    /// Path to the harmful-behavior scenario catalog
    #[arg(long, default_value = "datasets/bad_acts.json")]
    scenarios: PathBuf,

    /// Directory for the trajectory file
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,
}

/// Run the run command
pub async fn run(args: RunArgs) -> Result<()> {
    let catalog = ScenarioCatalog::load(&args.scenarios)
        .with_context(|| format!("failed to load scenarios from {}", args.scenarios.display()))?;

    let provider = LlmConfig::from_env()
        .build_provider(&args.model_client)
        .context("failed to configure the model client")?;
    if !provider.is_available().await {
        bail!("model client '{}' is not reachable", args.model_client);
    }

    let config = ExperimentConfig {
        environment: args.environment,
        adversarial_agent: args.adversarial_agent,
        safe: args.safe,
        guardian: args.guardian,
        n_runs: args.n_runs,
        base_seed: args.base_seed,
        id_label: args.id,
        model_client: args.model_client,
        out_dir: args.out_dir,
    };

    let runner = ExperimentRunner::new(config, provider);
    let path = runner.run(&catalog).await?;

    println!(
        "{} trajectories written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
