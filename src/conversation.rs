use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model-issued request to run a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    /// Argument object as produced by the model; never carries the root
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result of a dispatched tool call, routed back to the model
///
/// The payload is either `{"result": <text>}` or `{"error": <text>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub call_id: String,
    pub name: String,
    pub payload: Value,
}

impl ToolResponse {
    pub fn result(&self) -> Option<&str> {
        self.payload.get("result").and_then(Value::as_str)
    }

    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    ModelText(String),
    ModelToolCall(ToolCall),
    Tool(ToolResponse),
}

impl Turn {
    pub fn role(&self) -> Role {
        match self {
            Turn::User(_) => Role::User,
            Turn::ModelText(_) | Turn::ModelToolCall(_) => Role::Model,
            Turn::Tool(_) => Role::Tool,
        }
    }
}

/// Ordered record of one agent invocation
///
/// Append-only: turns can be added and read, never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Start a history containing exactly the user's request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::User(prompt.into())],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}
