//! The turn loop
//!
//! Strictly sequential: compute the next speaker from the accumulated
//! history, await that one participant's turn, append its messages, and
//! re-check termination after every appended message. When a selector
//! defers, the runner asks the model to name the next speaker and scans
//! the reply for the first roster token.

use sabot_core::ChatMessage;
use sabot_env::{Selection, Team};
use sabot_llm::LlmProvider;
use std::sync::Arc;

use crate::RuntimeError;

/// How many trailing messages the fallback prompt shows the model.
const FALLBACK_CONTEXT: usize = 6;

pub struct TeamRunner {
    llm: Arc<dyn LlmProvider>,
}

impl TeamRunner {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Run one episode to termination, returning the full transcript.
    pub async fn run(&self, team: &mut Team, task: &str) -> Result<Vec<ChatMessage>, RuntimeError> {
        let mut history = vec![ChatMessage::text("user", task)];

        loop {
            if let Some(reason) = team.termination().check(&history) {
                tracing::debug!(?reason, messages = history.len(), "episode terminated");
                break;
            }

            let role = match team.selector_mut().select(&history) {
                Selection::Speaker(role) => role,
                Selection::Fallback => self.fallback_select(&team.roster(), &history).await?,
            };
            tracing::trace!(role, "dispatching turn");

            let contents = team
                .agent_mut(&role)
                .ok_or_else(|| RuntimeError::UnknownRole(role.clone()))?
                .on_turn(&history)
                .await?;

            let mut stopped = false;
            for content in contents {
                history.push(ChatMessage {
                    source: role.clone(),
                    content,
                });
                if let Some(reason) = team.termination().check(&history) {
                    tracing::debug!(?reason, messages = history.len(), "episode terminated");
                    stopped = true;
                    break;
                }
            }
            if stopped {
                break;
            }
        }

        Ok(history)
    }

    /// Model-based next-speaker selection, used when a selector defers.
    ///
    /// The reply is scanned for the earliest roster token; a reply naming
    /// nobody hands the floor to the first participant. A malformed turn
    /// therefore routes, it never errors the episode.
    async fn fallback_select(
        &self,
        roster: &[String],
        history: &[ChatMessage],
    ) -> Result<String, RuntimeError> {
        let tail: Vec<String> = history
            .iter()
            .rev()
            .take(FALLBACK_CONTEXT)
            .filter_map(|m| m.as_text().map(|t| format!("{}: {}", m.source, t)))
            .collect();
        let tail: Vec<&str> = tail.iter().rev().map(String::as_str).collect();
        let prompt = format!(
            "You are moderating a conversation between the following agents: {}.\n\
             Recent messages:\n{}\n\
             Which agent should speak next? Answer with exactly one agent name.",
            roster.join(", "),
            tail.join("\n"),
        );
        let reply = self.llm.ask(&prompt).await?;

        let mut best: Option<(usize, &String)> = None;
        for role in roster {
            if let Some(pos) = reply.find(role.as_str()) {
                if best.map_or(true, |(b, _)| pos < b) {
                    best = Some((pos, role));
                }
            }
        }
        let chosen = match best {
            Some((_, role)) => role.clone(),
            None => {
                tracing::debug!(%reply, "fallback reply named no roster member");
                roster
                    .first()
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownRole(String::new()))?
            }
        };
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabot_env::{AssistantAgent, ChatAgent, RoundRobinSelector, Termination};
    use sabot_llm::MockProvider;

    fn debater(name: &str, reply: &str) -> Box<dyn ChatAgent> {
        Box::new(AssistantAgent::new(
            name,
            "debate",
            Arc::new(MockProvider::constant(reply)),
        ))
    }

    #[tokio::test]
    async fn round_robin_episode_runs_to_the_message_cap() {
        let mut team = Team::new(
            vec![
                debater("agent_0", "<ANSWER> A <ANSWER>"),
                debater("agent_1", "<ANSWER> B <ANSWER>"),
            ],
            Box::new(RoundRobinSelector::new(&["agent_0", "agent_1"])),
            Termination::max_messages(5),
        );
        let runner = TeamRunner::new(Arc::new(MockProvider::constant("")));
        let transcript = runner.run(&mut team, "pick a letter").await.unwrap();

        assert_eq!(transcript.len(), 5);
        let speakers: Vec<&str> = transcript.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(
            speakers,
            vec!["user", "agent_0", "agent_1", "agent_0", "agent_1"]
        );
    }

    #[tokio::test]
    async fn stop_token_halts_before_the_cap() {
        let mut team = Team::new(
            vec![
                debater("agent_0", "I concede, TERMINATE"),
                debater("agent_1", "never reached"),
            ],
            Box::new(RoundRobinSelector::new(&["agent_0", "agent_1"])),
            Termination::text_mention("TERMINAT").or(Termination::max_messages(50)),
        );
        let runner = TeamRunner::new(Arc::new(MockProvider::constant("")));
        let transcript = runner.run(&mut team, "debate").await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].source, "agent_0");
    }

    #[tokio::test]
    async fn fallback_scans_the_moderator_reply_for_a_roster_token() {
        let runner = TeamRunner::new(Arc::new(MockProvider::constant(
            "I think agent_1 should go next, not agent_0.",
        )));
        let roster = vec!["agent_0".to_string(), "agent_1".to_string()];
        let history = vec![ChatMessage::text("user", "start")];
        let chosen = runner.fallback_select(&roster, &history).await.unwrap();
        assert_eq!(chosen, "agent_1");
    }

    #[tokio::test]
    async fn fallback_defaults_to_the_first_participant() {
        let runner = TeamRunner::new(Arc::new(MockProvider::constant("no idea")));
        let roster = vec!["agent_0".to_string(), "agent_1".to_string()];
        let history = vec![ChatMessage::text("user", "start")];
        let chosen = runner.fallback_select(&roster, &history).await.unwrap();
        assert_eq!(chosen, "agent_0");
    }
}
