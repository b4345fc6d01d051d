//! Conversation messages
//!
//! The transcript is one ordered shared log; a role's view is obtained by
//! filtering on `source`. Message content is either free text or a recorded
//! tool-call payload (argument mapping), mirroring what agent frameworks
//! persist for function-calling turns.

use serde::{Deserialize, Serialize};

/// A single recorded tool invocation with its argument mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as the agent invoked it
    pub name: String,
    /// Named arguments passed to the tool
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    /// Flatten argument values into one searchable string.
    pub fn argument_text(&self) -> String {
        let mut out = String::new();
        for value in self.arguments.values() {
            if !out.is_empty() {
                out.push(' ');
            }
            match value {
                serde_json::Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        }
        out
    }
}

/// Content of one message: free text, or a tool-call payload.
///
/// Serialized untagged: text is a JSON string, tool calls a JSON array,
/// which keeps persisted trajectories readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

impl MessageContent {
    /// Text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::ToolCalls(_) => None,
        }
    }

    pub fn is_tool_calls(&self) -> bool {
        matches!(self, MessageContent::ToolCalls(_))
    }
}

/// One entry in the shared conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role label of the speaker ("user" for the initial task)
    pub source: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn text(source: &str, content: &str) -> Self {
        Self {
            source: source.to_string(),
            content: MessageContent::Text(content.to_string()),
        }
    }

    pub fn tool_calls(source: &str, calls: Vec<ToolCall>) -> Self {
        Self {
            source: source.to_string(),
            content: MessageContent::ToolCalls(calls),
        }
    }

    /// Text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        self.content.as_text()
    }
}
