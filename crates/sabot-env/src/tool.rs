//! Tool-capable agents
//!
//! Tool-backed participants drive a simulator (messaging, ticketing, file
//! system, ...) instead of the outside world. The model is told to emit
//! `CALL <tool> {json-args}` lines; each parsed call is executed against
//! the simulator, recorded as a tool-call payload in the transcript, and
//! followed by one text message with the tool results. Malformed directives
//! are dropped, not raised.

use async_trait::async_trait;
use sabot_llm::{LlmProvider, LlmRequest};
use std::sync::Arc;

use sabot_core::{ChatMessage, MessageContent, ToolCall};

use crate::agent::{render_history, ChatAgent};
use crate::EnvError;

/// One callable simulator action.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// Execute with named arguments, returning the result text.
    fn invoke(&self, arguments: &serde_json::Map<String, serde_json::Value>) -> String;
}

/// An LLM-backed participant with access to a tool table.
pub struct ToolAgent {
    name: String,
    system_message: String,
    llm: Arc<dyn LlmProvider>,
    tools: Vec<Box<dyn Tool>>,
}

impl ToolAgent {
    pub fn new(
        name: &str,
        system_message: &str,
        llm: Arc<dyn LlmProvider>,
        tools: Vec<Box<dyn Tool>>,
    ) -> Self {
        let mut listing = String::new();
        for tool in &tools {
            listing.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
        }
        let system_message = format!(
            "{system_message}\n\nYou can use the following tools:\n{listing}\
             To use a tool, write a line of the form: CALL <tool_name> {{\"arg\": \"value\"}}"
        );
        Self {
            name: name.to_string(),
            system_message,
            llm,
            tools,
        }
    }

    fn parse_calls(&self, draft: &str) -> Vec<ToolCall> {
        let mut calls = Vec::new();
        for line in draft.lines() {
            let line = line.trim();
            let rest = match line.strip_prefix("CALL ") {
                Some(rest) => rest,
                None => continue,
            };
            let (name, args) = match rest.split_once(' ') {
                Some((name, args)) => (name.trim(), args.trim()),
                None => (rest.trim(), "{}"),
            };
            if !self.tools.iter().any(|t| t.name() == name) {
                tracing::debug!(tool = name, "dropping directive for unknown tool");
                continue;
            }
            match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(args) {
                Ok(arguments) => calls.push(ToolCall {
                    name: name.to_string(),
                    arguments,
                }),
                Err(err) => {
                    tracing::debug!(tool = name, %err, "dropping malformed tool directive");
                }
            }
        }
        calls
    }
}

#[async_trait]
impl ChatAgent for ToolAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_turn(&mut self, history: &[ChatMessage]) -> Result<Vec<MessageContent>, EnvError> {
        let prompt = format!(
            "Conversation so far:\n{}\nIt is your turn to respond as {}.",
            render_history(history),
            self.name
        );
        let response = self
            .llm
            .complete(LlmRequest::with_role(&self.system_message, &prompt))
            .await?;
        tracing::debug!(
            role = %self.name,
            model = %response.model,
            latency_ms = response.latency_ms,
            "turn completed"
        );
        let draft = response.content;

        let calls = self.parse_calls(&draft);
        if calls.is_empty() {
            return Ok(vec![MessageContent::Text(draft)]);
        }

        let mut results = Vec::new();
        for call in &calls {
            // parse_calls only keeps directives naming a registered tool
            if let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) {
                results.push(tool.invoke(&call.arguments));
            }
        }
        Ok(vec![
            MessageContent::ToolCalls(calls),
            MessageContent::Text(results.join("\n")),
        ])
    }
}
