//! Tool-call round trip: Propose → (Resolve → Execute) → Synthesize.
//!
//! 1. Send system prompt + query with the current catalog, `tool_choice=auto`
//! 2. In test mode, stop and report the proposed calls
//! 3. In autonomous mode, run each call in model order and append its result
//! 4. Ask the model again, without tools, for the final answer
//!
//! Every failure ends the round trip; nothing is retried.

use crate::agent::system_prompt;
use crate::catalog::ToolSchema;
use crate::error::Result;
use crate::gateway::{CompletionGateway, CompletionRequest};
use crate::tools::{self, ToolResolver};
use crate::types::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Orchestrator {
    gateway: Arc<dyn CompletionGateway>,
    resolver: ToolResolver,
    model: String,
    unit_hint: Option<TemperatureUnit>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn CompletionGateway>, resolver: ToolResolver, model: &str) -> Self {
        Self {
            gateway,
            resolver,
            model: model.to_string(),
            unit_hint: None,
        }
    }

    /// Hint the default temperature unit in the system prompt.
    pub fn with_unit_hint(mut self, unit: Option<TemperatureUnit>) -> Self {
        self.unit_hint = unit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one full round trip for `query` against `catalog`.
    pub async fn round_trip(
        &self,
        query: &str,
        catalog: &[ToolSchema],
        mode: Mode,
    ) -> Result<RoundTripResult> {
        let (mut messages, proposal) = self.propose(query, catalog).await?;

        let proposed_calls: Vec<ProposedCall> =
            proposal.tool_calls.iter().map(ProposedCall::from).collect();

        if proposal.tool_calls.is_empty() {
            return Ok(RoundTripResult {
                model_message: proposal.content.clone(),
                final_message: proposal.content,
                proposed_calls,
            });
        }

        if mode == Mode::Test {
            info!(
                "Test mode: {} proposed call(s), not executing",
                proposed_calls.len()
            );
            return Ok(RoundTripResult {
                model_message: proposal.content,
                final_message: None,
                proposed_calls,
            });
        }

        messages.push(ConversationMessage::assistant(
            proposal.content.clone(),
            proposal.tool_calls.clone(),
        ));

        for call in &proposal.tool_calls {
            let tool = self.resolver.resolve(&call.name)?;
            info!(
                "Tool: {}({})",
                call.name,
                serde_json::Value::Object(call.arguments.clone())
            );
            let output = tools::render_result(&tool.execute(&call.arguments).await?);
            debug!("Tool {} returned {}", call.name, output);
            messages.push(ConversationMessage::tool(call, output));
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            tools: None,
            tool_choice: ToolChoice::Auto,
        };
        let final_completion = self.gateway.complete(&request).await?;

        Ok(RoundTripResult {
            model_message: proposal.content,
            final_message: final_completion.content,
            proposed_calls,
        })
    }

    /// Propose phase shared by both modes. Returns the conversation so far
    /// and the model's answer to it.
    async fn propose(
        &self,
        query: &str,
        catalog: &[ToolSchema],
    ) -> Result<(Vec<ConversationMessage>, Completion)> {
        let messages = vec![
            ConversationMessage::system(system_prompt::build_system_prompt(self.unit_hint)),
            ConversationMessage::user(query),
        ];

        // An empty tools array is rejected upstream; offer none instead.
        let tools = if catalog.is_empty() {
            None
        } else {
            Some(catalog.to_vec())
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            tools,
            tool_choice: ToolChoice::Auto,
        };
        let completion = self.gateway.complete(&request).await?;
        Ok((request.messages, completion))
    }
}
