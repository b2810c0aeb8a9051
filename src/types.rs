//! Shared types used across the round-trip harness.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A single message in the chat conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    /// Assistant turn, possibly carrying tool calls instead of (or next to) text.
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallProposal>,
    },
    /// Result of one tool call, correlated by `call_id` to the preceding assistant turn.
    Tool {
        call_id: String,
        name: String,
        content: String,
    },
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCallProposal>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool(call: &ToolCallProposal, content: impl Into<String>) -> Self {
        Self::Tool {
            call_id: call.call_id.clone(),
            name: call.name.clone(),
            content: content.into(),
        }
    }

    /// Wire-level role name.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

/// A tool call proposed by the model, with its arguments already decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallProposal {
    /// Opaque id assigned upstream; echoed back on the tool-result message.
    pub call_id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// The externally visible part of a proposal: what was called and with what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl From<&ToolCallProposal> for ProposedCall {
    fn from(call: &ToolCallProposal) -> Self {
        Self {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        }
    }
}

/// Tool-choice policy sent with a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call any tool.
    #[default]
    Auto,
}

/// Structured result of one completion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallProposal>,
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

/// Whether proposed calls are only reported or also executed and fed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Propose only. No tool runs, no second completion.
    Test,
    /// Propose, execute every call, then ask the model to synthesize an answer.
    Autonomous,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Autonomous => write!(f, "autonomous"),
        }
    }
}

/// Outcome of one full round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTripResult {
    /// Text content of the first (proposing) completion.
    pub model_message: Option<String>,
    /// Synthesized answer; absent in test mode when tools were proposed.
    pub final_message: Option<String>,
    pub proposed_calls: Vec<ProposedCall>,
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius => write!(f, "Celsius"),
            Self::Fahrenheit => write!(f, "Fahrenheit"),
        }
    }
}
