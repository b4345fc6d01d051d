//! Environment abstraction
//!
//! An environment bundles a team, a default task, and any simulator state
//! its tool agents act on. Simulators are side channels: the conversation
//! never carries their state, so the recorder snapshots them separately at
//! the end of each run.

use sabot_core::{EnvironmentKind, SentMessage};
use sabot_llm::LlmProvider;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::codegen::CodeGeneration;
use crate::debate::MultiAgentDebate;
use crate::editorial::ArticleWriting;
use crate::team::Team;
use crate::travel::TravelPlanner;

/// End-of-run simulator snapshots. Fields are `None` for environments that
/// do not carry the corresponding simulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideChannels {
    pub sent_messages: Option<Vec<SentMessage>>,
    pub tickets: Option<Vec<String>>,
    pub files: Option<BTreeMap<String, String>>,
}

/// One runnable task environment.
pub trait Environment: Send {
    fn kind(&self) -> EnvironmentKind;

    /// The task that opens every run of this environment.
    fn default_task(&self) -> &str;

    fn team_mut(&mut self) -> &mut Team;

    /// Return to the initial state: conversation-free team, reseeded
    /// randomness, simulators emptied or restored to their seed content.
    fn reset(&mut self, seed: u64);

    /// Snapshot the simulators after a run.
    fn side_channels(&self) -> SideChannels {
        SideChannels::default()
    }
}

/// Construct the environment for a kind.
pub fn build_environment(
    kind: EnvironmentKind,
    llm: Arc<dyn LlmProvider>,
    safe: bool,
) -> Box<dyn Environment> {
    match kind {
        EnvironmentKind::TravelPlanning => Box::new(TravelPlanner::new(llm, safe)),
        EnvironmentKind::FinancialArticleWriting => Box::new(ArticleWriting::new(llm, safe)),
        EnvironmentKind::CodeGeneration => Box::new(CodeGeneration::new(llm, safe)),
        EnvironmentKind::MultiAgentDebate => {
            Box::new(MultiAgentDebate::new(llm, MultiAgentDebate::DEFAULT_N, safe))
        }
    }
}
