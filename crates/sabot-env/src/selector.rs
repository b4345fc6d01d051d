//! Next-speaker selection
//!
//! A selector decides, from the accumulated history alone, which role
//! speaks next. Returning [`Selection::Fallback`] defers to the runner's
//! model-based selection; a malformed message therefore routes, it never
//! errors.

use sabot_core::ChatMessage;

/// Outcome of one selection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The named role speaks next.
    Speaker(String),
    /// Defer to model-based fallback selection.
    Fallback,
}

/// The single capability every topology implements.
///
/// Selectors may carry per-run state (phase flags, interception memos);
/// `reset` must clear all of it.
pub trait SpeakerSelector: Send {
    fn select(&mut self, history: &[ChatMessage]) -> Selection;

    fn reset(&mut self) {}
}

/// Which occurrence wins when a message names several addressees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    First,
    Last,
}

/// Extract one canonical addressee from free text.
///
/// `tokens` maps a literal token to the role it addresses. All occurrences
/// of all tokens are located; the tie-break picks the earliest or latest by
/// byte position. Returns `None` when no token occurs.
pub fn extract_addressee<'a>(
    text: &str,
    tokens: &'a [(String, String)],
    tie_break: TieBreak,
) -> Option<&'a str> {
    let mut best: Option<(usize, &str)> = None;
    for (token, role) in tokens {
        for (pos, _) in text.match_indices(token.as_str()) {
            let better = match (&best, tie_break) {
                (None, _) => true,
                (Some((b, _)), TieBreak::First) => pos < *b,
                (Some((b, _)), TieBreak::Last) => pos > *b,
            };
            if better {
                best = Some((pos, role.as_str()));
            }
        }
    }
    best.map(|(_, role)| role)
}

/// Centralized topology: one hub role addresses spokes with `NEXT <ROLE>`;
/// every other role returns to the hub unconditionally.
pub struct HubSelector {
    hub: String,
    /// `("NEXT <ROLE>", role)` pairs; first occurrence wins
    tokens: Vec<(String, String)>,
}

impl HubSelector {
    pub fn new(hub: &str, spokes: &[&str]) -> Self {
        Self {
            hub: hub.to_string(),
            tokens: spokes
                .iter()
                .map(|role| (format!("NEXT {role}"), role.to_string()))
                .collect(),
        }
    }
}

impl SpeakerSelector for HubSelector {
    fn select(&mut self, history: &[ChatMessage]) -> Selection {
        let last = match history.last() {
            Some(m) => m,
            None => return Selection::Fallback,
        };
        if last.source != self.hub {
            return Selection::Speaker(self.hub.clone());
        }
        match last
            .as_text()
            .and_then(|text| extract_addressee(text, &self.tokens, TieBreak::First))
        {
            Some(role) => Selection::Speaker(role.to_string()),
            None => Selection::Fallback,
        }
    }
}

/// Decentralized topology: any agent may name the next speaker; the last
/// named role wins. Self-addressing or a message with no addressee returns
/// control to the coordinator; a coordinator message with no addressee
/// defers to fallback.
pub struct PeerSelector {
    /// `(token, role)` pairs; last occurrence wins
    tokens: Vec<(String, String)>,
    coordinator: String,
}

impl PeerSelector {
    pub fn new(tokens: &[(&str, &str)], coordinator: &str) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(t, r)| (t.to_string(), r.to_string()))
                .collect(),
            coordinator: coordinator.to_string(),
        }
    }
}

impl SpeakerSelector for PeerSelector {
    fn select(&mut self, history: &[ChatMessage]) -> Selection {
        let last = match history.last() {
            Some(m) => m,
            None => return Selection::Fallback,
        };
        let addressee = last
            .as_text()
            .and_then(|text| extract_addressee(text, &self.tokens, TieBreak::Last));
        match addressee {
            Some(role) if role != last.source => Selection::Speaker(role.to_string()),
            Some(_) => Selection::Speaker(self.coordinator.clone()),
            None if last.source == self.coordinator => Selection::Fallback,
            None => Selection::Speaker(self.coordinator.clone()),
        }
    }
}

/// Fixed rotation: next = (index of last speaker + 1) mod N, content
/// ignored. The initial user message hands the floor to the first role.
pub struct RoundRobinSelector {
    roster: Vec<String>,
}

impl RoundRobinSelector {
    pub fn new(roster: &[&str]) -> Self {
        Self {
            roster: roster.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl SpeakerSelector for RoundRobinSelector {
    fn select(&mut self, history: &[ChatMessage]) -> Selection {
        let last = match history.last() {
            Some(m) => m,
            None => return Selection::Fallback,
        };
        if last.source == "user" {
            return Selection::Speaker(self.roster[0].clone());
        }
        match self.roster.iter().position(|r| *r == last.source) {
            Some(i) => Selection::Speaker(self.roster[(i + 1) % self.roster.len()].clone()),
            None => Selection::Fallback,
        }
    }
}
