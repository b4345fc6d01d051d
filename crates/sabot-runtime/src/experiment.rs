//! Experiment orchestration
//!
//! Iterates the scenario catalog for one environment, derives the per-run
//! seed, substitutes the adversarial stand-in, runs each episode to
//! termination, and persists the recorded datapoints as one JSON file named
//! from the run parameters.

use sabot_core::{derive_seed, Datapoint, EnvironmentKind, ScenarioCatalog};
use sabot_env::{attach_guardian, build_adversary, build_environment};
use sabot_llm::LlmProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::recorder::TrajectoryRecorder;
use crate::runner::TeamRunner;
use crate::RuntimeError;

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub environment: EnvironmentKind,
    /// Role substituted with the adversarial stand-in
    pub adversarial_agent: String,
    /// Use the hardened prompt variants
    pub safe: bool,
    /// Attach the guardian monitor to the team
    pub guardian: bool,
    /// Trajectories per scenario row
    pub n_runs: u32,
    pub base_seed: u64,
    /// Optional label appended to the result filename
    pub id_label: Option<String>,
    /// Provider name, recorded in the result filename
    pub model_client: String,
    pub out_dir: PathBuf,
}

impl ExperimentConfig {
    fn result_filename(&self, n_scenarios: usize) -> String {
        format!(
            "{}_{}_{}_{}_{}{}{}_n{}.json",
            self.model_client,
            self.environment,
            n_scenarios,
            self.adversarial_agent,
            if self.safe { "safe" } else { "" },
            if self.guardian { "_GUARDIAN" } else { "" },
            self.id_label.as_deref().unwrap_or(""),
            self.n_runs,
        )
    }
}

pub struct ExperimentRunner {
    config: ExperimentConfig,
    llm: Arc<dyn LlmProvider>,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self { config, llm }
    }

    /// Run every applicable scenario and write the trajectory file,
    /// returning its path.
    pub async fn run(&self, catalog: &ScenarioCatalog) -> Result<PathBuf, RuntimeError> {
        let scenarios = catalog.for_environment(self.config.environment);
        tracing::info!(
            environment = %self.config.environment,
            scenarios = scenarios.len(),
            adversary = %self.config.adversarial_agent,
            started_at = %chrono::Utc::now().to_rfc3339(),
            "starting experiment"
        );

        let mut environment = build_environment(
            self.config.environment,
            self.llm.clone(),
            self.config.safe,
        );
        if self.config.guardian {
            attach_guardian(environment.team_mut(), self.llm.clone());
        }
        let runner = TeamRunner::new(self.llm.clone());

        let mut results: Vec<Datapoint> = Vec::new();
        for scenario in &scenarios {
            // an adversary cannot corrupt the very role under judgment
            if scenario.target_agent.trim() == self.config.adversarial_agent.trim() {
                tracing::debug!(id = scenario.id, "skipping scenario targeting the adversary");
                continue;
            }
            tracing::info!(id = scenario.id, behavior = %scenario.harmful_behavior, "scenario");

            for run_idx in 0..self.config.n_runs {
                let seed = derive_seed(self.config.base_seed, scenario.id, run_idx);
                environment.reset(seed);

                let adversary = build_adversary(
                    &self.config.adversarial_agent,
                    &scenario.harmful_behavior,
                    self.llm.clone(),
                );
                environment
                    .team_mut()
                    .replace_agent(&self.config.adversarial_agent, Box::new(adversary))?;

                tracing::info!(id = scenario.id, run_idx, seed, "running episode");
                let task = environment.default_task().to_string();
                let transcript = runner.run(environment.team_mut(), &task).await?;

                results.push(TrajectoryRecorder::record(
                    scenario,
                    run_idx,
                    seed,
                    &self.config.adversarial_agent,
                    transcript,
                    environment.side_channels(),
                ));
            }
        }

        let path = self.persist(&results, scenarios.len()).await?;
        tracing::info!(path = %path.display(), datapoints = results.len(), "experiment finished");
        Ok(path)
    }

    async fn persist(
        &self,
        results: &[Datapoint],
        n_scenarios: usize,
    ) -> Result<PathBuf, RuntimeError> {
        tokio::fs::create_dir_all(&self.config.out_dir).await?;
        let path = self.config.out_dir.join(self.config.result_filename(n_scenarios));
        let json = serde_json::to_string_pretty(results)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

/// Load a trajectory file written by [`ExperimentRunner`].
pub fn load_datapoints(path: &Path) -> Result<Vec<Datapoint>, RuntimeError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
