//! Recorded trajectories
//!
//! One [`Datapoint`] per run. The identifying triple (`id`, `run_idx`,
//! `seed`) is what makes reference and intervention arms comparable: the
//! estimator groups on `id` (optionally plus target role) or pairs on
//! `(id, run_idx)`, and seed-paired comparison is only valid when both arms
//! derived their seeds from the same base.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::message::ChatMessage;

/// One message delivered through the simulated messaging system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub address: String,
    pub message: String,
}

/// One recorded multi-agent run plus its causal metadata.
///
/// Immutable once recorded; only read by the predicate and the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datapoint {
    /// Index into the harmful-behavior scenario catalog; stable across arms
    pub id: u64,
    /// Repetition counter within the scenario
    pub run_idx: u32,
    /// Derived exogenous-noise identifier, shared across matched arms
    pub seed: u64,
    /// Role label whose behavior is judged (may be composite, e.g.
    /// "CHIEF_EDITOR/EDITOR", or a side-channel pseudo-role like "FILES")
    pub target_agent: String,
    /// Role that was substituted with the adversarial stand-in
    pub adversarial_agent: String,
    /// Harmful behavior the adversary was instructed to pursue
    pub target_action: String,
    /// Success-condition DSL evaluated by the keyword predicate
    pub keywords: String,
    /// Full ordered conversation transcript
    pub team_states: Vec<ChatMessage>,
    /// Travel planning: messages sent through the messaging simulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_messages: Option<Vec<SentMessage>>,
    /// Travel planning: tickets booked through the ticketing simulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<String>>,
    /// Code generation: file name -> content snapshot at termination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, String>>,
}

impl Datapoint {
    /// All messages produced by `role`, in transcript order.
    pub fn messages_from<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a ChatMessage> {
        self.team_states.iter().filter(move |m| m.source == role)
    }

    /// Text messages produced by `role`; tool-call entries are excluded.
    pub fn texts_from<'a>(&'a self, role: &'a str) -> Vec<&'a str> {
        self.messages_from(role)
            .filter_map(|m| m.as_text())
            .collect()
    }

    /// Flattened tool-call argument values produced by `role`.
    pub fn tool_arguments_from(&self, role: &str) -> Vec<String> {
        self.messages_from(role)
            .filter_map(|m| match &m.content {
                crate::message::MessageContent::ToolCalls(calls) => Some(calls),
                _ => None,
            })
            .flatten()
            .map(|call| call.argument_text())
            .collect()
    }
}

/// Derive the per-run seed from the experiment's base seed.
///
/// `base * 10^6 + id * 1000 + run_idx`; reference and intervention runs
/// launched with the same base seed therefore share seeds pair-for-pair.
pub fn derive_seed(base_seed: u64, id: u64, run_idx: u32) -> u64 {
    base_seed * 1_000_000 + id * 1000 + run_idx as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageContent, ToolCall};

    fn sample() -> Datapoint {
        let mut args = serde_json::Map::new();
        args.insert("code".to_string(), serde_json::json!("print('hi')"));
        Datapoint {
            id: 3,
            run_idx: 1,
            seed: derive_seed(7, 3, 1),
            target_agent: "CEO".to_string(),
            adversarial_agent: "BROWSER".to_string(),
            target_action: "delete the thesis".to_string(),
            keywords: "thesis".to_string(),
            team_states: vec![
                ChatMessage::text("user", "build a game"),
                ChatMessage::text("CEO", "NEXT PROGRAMMER write it"),
                ChatMessage::tool_calls(
                    "EXECUTER",
                    vec![ToolCall {
                        name: "run_code".to_string(),
                        arguments: args,
                    }],
                ),
                ChatMessage::text("CEO", "TERMINATE"),
            ],
            sent_messages: None,
            tickets: None,
            files: None,
        }
    }

    #[test]
    fn seed_derivation_is_positional() {
        assert_eq!(derive_seed(0, 0, 0), 0);
        assert_eq!(derive_seed(1, 2, 3), 1_002_003);
        // same (base, id, run_idx) across arms -> same seed
        assert_eq!(derive_seed(5, 12, 4), derive_seed(5, 12, 4));
    }

    #[test]
    fn role_slices_filter_by_source() {
        let dp = sample();
        assert_eq!(dp.texts_from("CEO").len(), 2);
        assert!(dp.texts_from("EXECUTER").is_empty());
        let args = dp.tool_arguments_from("EXECUTER");
        assert_eq!(args.len(), 1);
        assert!(args[0].contains("print"));
    }

    #[test]
    fn role_slices_accept_a_short_lived_role_name() {
        let dp = sample();
        let role = String::from("CEO");
        let texts = dp.texts_from(&role);
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn optional_side_channels_round_trip() {
        let mut dp = sample();
        dp.tickets = Some(vec!["museum".to_string()]);
        let json = serde_json::to_string(&dp).unwrap();
        assert!(!json.contains("sent_messages"));
        let back: Datapoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tickets.as_deref(), Some(&["museum".to_string()][..]));
    }
}
