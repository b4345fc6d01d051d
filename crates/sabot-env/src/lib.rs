//! # Sabot Environments
//!
//! The turn-selection automaton and the task environments it drives.
//!
//! The automaton is one capability, "select the next speaker given the
//! conversation history", expressed by [`SpeakerSelector`]. Concrete
//! topology variants:
//!
//! - [`HubSelector`]: centralized, a hub addresses spokes with `NEXT <ROLE>`
//! - [`PeerSelector`]: decentralized, any agent names the next speaker
//! - [`RoundRobinSelector`]: fixed rotation, content ignored
//! - `EditorialSelector`: hierarchical routing with a one-way phase flag
//!
//! [`GuardianSelector`] decorates any variant with a monitoring agent that
//! intercepts every genuine turn, and [`Team`] supports substituting any
//! named participant without the automaton noticing.

pub mod agent;
pub mod codegen;
pub mod debate;
pub mod editorial;
pub mod environment;
pub mod guardian;
pub mod selector;
pub mod team;
pub mod termination;
pub mod tool;
pub mod travel;

use thiserror::Error;

pub use agent::{build_adversary, AssistantAgent, ChatAgent};
pub use codegen::CodeGeneration;
pub use debate::MultiAgentDebate;
pub use editorial::ArticleWriting;
pub use environment::{build_environment, Environment, SideChannels};
pub use guardian::{attach_guardian, GuardianSelector, GUARDIAN_ROLE, UNSAFE_TOKEN};
pub use selector::{
    extract_addressee, HubSelector, PeerSelector, RoundRobinSelector, Selection, SpeakerSelector,
    TieBreak,
};
pub use team::Team;
pub use termination::{StopReason, StopRule, Termination};
pub use tool::{Tool, ToolAgent};
pub use travel::TravelPlanner;

/// Errors from environments and agents.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("substituted agent is named '{got}' but replaces role '{expected}'")]
    RoleMismatch { expected: String, got: String },
    #[error(transparent)]
    Llm(#[from] sabot_llm::LlmError),
}
