//! Team container
//!
//! Owns the ordered participant roster, the selector, and the termination
//! condition. Substitution swaps one named participant in place; roster
//! order and role identifiers are preserved, so selectors never observe
//! the swap.

use sabot_core::ChatMessage;

use crate::agent::ChatAgent;
use crate::guardian::GuardianSelector;
use crate::selector::{Selection, SpeakerSelector};
use crate::termination::Termination;
use crate::EnvError;

struct NullSelector;

impl SpeakerSelector for NullSelector {
    fn select(&mut self, _history: &[ChatMessage]) -> Selection {
        Selection::Fallback
    }
}

pub struct Team {
    participants: Vec<Box<dyn ChatAgent>>,
    selector: Box<dyn SpeakerSelector>,
    termination: Termination,
}

impl Team {
    pub fn new(
        participants: Vec<Box<dyn ChatAgent>>,
        selector: Box<dyn SpeakerSelector>,
        termination: Termination,
    ) -> Self {
        Self {
            participants,
            selector,
            termination,
        }
    }

    /// Role labels in roster order.
    pub fn roster(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn agent_mut(&mut self, role: &str) -> Option<&mut Box<dyn ChatAgent>> {
        self.participants.iter_mut().find(|a| a.name() == role)
    }

    pub fn selector_mut(&mut self) -> &mut dyn SpeakerSelector {
        self.selector.as_mut()
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    /// Swap one named participant's implementation, in place.
    ///
    /// The replacement must answer to the same role label; routing operates
    /// on role identifiers, not implementations.
    pub fn replace_agent(&mut self, role: &str, agent: Box<dyn ChatAgent>) -> Result<(), EnvError> {
        if agent.name() != role {
            return Err(EnvError::RoleMismatch {
                expected: role.to_string(),
                got: agent.name().to_string(),
            });
        }
        let slot = self
            .participants
            .iter_mut()
            .find(|a| a.name() == role)
            .ok_or_else(|| EnvError::UnknownRole(role.to_string()))?;
        *slot = agent;
        Ok(())
    }

    /// Attach a monitoring participant that intercepts every genuine turn.
    ///
    /// Wraps the current selector in a [`GuardianSelector`] and ORs the
    /// monitor's stop token into the termination condition.
    pub fn intercept(&mut self, monitor: Box<dyn ChatAgent>, stop_token: &str) {
        let monitor_role = monitor.name().to_string();
        self.participants.push(monitor);
        let base = std::mem::replace(&mut self.selector, Box::new(NullSelector));
        self.selector = Box::new(GuardianSelector::wrap(base, &monitor_role));
        self.termination = std::mem::take(&mut self.termination)
            .or(Termination::text_mention(stop_token));
    }

    /// Clear per-run state on the selector and every participant.
    pub fn reset(&mut self) {
        self.selector.reset();
        for agent in &mut self.participants {
            agent.reset();
        }
    }
}
