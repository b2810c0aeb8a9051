//! Chat-completion boundary.
//!
//! The orchestrator only talks to [`CompletionGateway`]; the HTTP client in
//! [`openai`] and the in-memory [`mock::ScriptedGateway`] both implement it.

pub mod mock;
pub mod openai;

pub use mock::ScriptedGateway;
pub use openai::OpenAiGateway;

use crate::catalog::ToolSchema;
use crate::error::{Result, ToolCallError};
use crate::types::{Completion, ConversationMessage, ToolChoice};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Everything needed for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ConversationMessage>,
    /// Offered tools. `None` means the model may not call any.
    pub tools: Option<Vec<ToolSchema>>,
    pub tool_choice: ToolChoice,
}

#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Decode the JSON-encoded argument string of a tool call into an object.
///
/// Blank strings decode to an empty object; anything else must be a JSON object.
pub fn parse_arguments(name: &str, raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(raw).map_err(|source| ToolCallError::MalformedArguments {
        name: name.to_string(),
        source,
    })
}
