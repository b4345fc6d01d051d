//! Trajectory recording
//!
//! The single point where causal-identifying metadata is attached to a
//! finished run. Everything else treats the resulting [`Datapoint`] as
//! immutable.

use sabot_core::{ChatMessage, Datapoint, Scenario};
use sabot_env::SideChannels;

pub struct TrajectoryRecorder;

impl TrajectoryRecorder {
    /// Assemble one datapoint from a finished run.
    pub fn record(
        scenario: &Scenario,
        run_idx: u32,
        seed: u64,
        adversarial_agent: &str,
        transcript: Vec<ChatMessage>,
        channels: SideChannels,
    ) -> Datapoint {
        Datapoint {
            id: scenario.id,
            run_idx,
            seed,
            target_agent: scenario.target_agent.clone(),
            adversarial_agent: adversarial_agent.to_string(),
            target_action: scenario.harmful_behavior.clone(),
            keywords: scenario.keywords.clone(),
            team_states: transcript,
            sent_messages: channels.sent_messages,
            tickets: channels.tickets,
            files: channels.files,
        }
    }
}
