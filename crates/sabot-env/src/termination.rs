//! Run termination
//!
//! A run stops on the first satisfied rule: a literal stop token in the
//! latest text message, or the message cap. Rules combine with OR; the
//! guardian's UNSAFE verdict is layered in the same way.

use sabot_core::ChatMessage;

/// One independent stop predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopRule {
    /// Literal (case-sensitive) substring of the latest text message.
    TextMention(String),
    /// Total messages in the run, the initial task included.
    MaxMessages(usize),
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    TextMention(String),
    MaxMessages(usize),
}

/// OR-combination of stop rules.
#[derive(Debug, Clone, Default)]
pub struct Termination {
    rules: Vec<StopRule>,
}

impl Termination {
    pub fn text_mention(token: &str) -> Self {
        Self {
            rules: vec![StopRule::TextMention(token.to_string())],
        }
    }

    pub fn max_messages(limit: usize) -> Self {
        Self {
            rules: vec![StopRule::MaxMessages(limit)],
        }
    }

    /// OR this condition with another; either side stopping stops the run.
    pub fn or(mut self, other: Termination) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// First satisfied rule, if any.
    pub fn check(&self, history: &[ChatMessage]) -> Option<StopReason> {
        for rule in &self.rules {
            match rule {
                StopRule::TextMention(token) => {
                    if let Some(text) = history.last().and_then(|m| m.as_text()) {
                        if text.contains(token.as_str()) {
                            return Some(StopReason::TextMention(token.clone()));
                        }
                    }
                }
                StopRule::MaxMessages(limit) => {
                    if history.len() >= *limit {
                        return Some(StopReason::MaxMessages(*limit));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mention_matches_latest_message_only() {
        let stop = Termination::text_mention("TERMINAT");
        let history = vec![
            ChatMessage::text("CEO", "TERMINATE"),
            ChatMessage::text("PROGRAMMER", "still working"),
        ];
        assert_eq!(stop.check(&history), None);

        let history = vec![ChatMessage::text("CEO", "all done, TERMINATE")];
        assert_eq!(
            stop.check(&history),
            Some(StopReason::TextMention("TERMINAT".to_string()))
        );
    }

    #[test]
    fn or_is_first_satisfied_rule() {
        let stop = Termination::text_mention("APPROVE_ARTICLE").or(Termination::max_messages(3));
        let history = vec![
            ChatMessage::text("user", "write"),
            ChatMessage::text("CHIEF_EDITOR", "draft it"),
        ];
        assert_eq!(stop.check(&history), None);

        let history = vec![
            ChatMessage::text("user", "write"),
            ChatMessage::text("CHIEF_EDITOR", "draft it"),
            ChatMessage::text("WRITER", "a draft"),
        ];
        assert_eq!(
            stop.check(&history),
            Some(StopReason::MaxMessages(3))
        );
    }

    #[test]
    fn tool_call_messages_never_match_text_rules() {
        let stop = Termination::text_mention("UNSAFE");
        let history = vec![ChatMessage::tool_calls("EXECUTER", vec![])];
        assert_eq!(stop.check(&history), None);
    }
}
