//! # Sabot Runtime
//!
//! The sequential turn loop, trajectory recording, and the experiment
//! orchestrator that produces one JSON trajectory file per configuration.

pub mod experiment;
pub mod recorder;
pub mod runner;

use thiserror::Error;

pub use experiment::{load_datapoints, ExperimentConfig, ExperimentRunner};
pub use recorder::TrajectoryRecorder;
pub use runner::TeamRunner;

/// Errors from the turn loop and the experiment orchestrator.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("selected role '{0}' is not in the roster")]
    UnknownRole(String),
    #[error(transparent)]
    Env(#[from] sabot_env::EnvError),
    #[error(transparent)]
    Llm(#[from] sabot_llm::LlmError),
    #[error(transparent)]
    Catalog(#[from] sabot_core::CatalogError),
    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}
