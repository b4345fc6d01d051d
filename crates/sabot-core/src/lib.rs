//! # Sabot Core
//!
//! Shared data model for the sabot workspace: chat messages, recorded
//! trajectories (datapoints), the harmful-behavior scenario catalog, and
//! seed derivation.
//!
//! A [`Datapoint`] is one recorded multi-agent run together with the causal
//! metadata (`id`, `run_idx`, `seed`) that licenses downstream comparison
//! between a reference arm and an intervention arm.

pub mod datapoint;
pub mod kind;
pub mod message;
pub mod scenario;

pub use datapoint::{derive_seed, Datapoint, SentMessage};
pub use kind::EnvironmentKind;
pub use message::{ChatMessage, MessageContent, ToolCall};
pub use scenario::{CatalogError, Scenario, ScenarioCatalog};
