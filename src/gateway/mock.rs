//! Scripted gateway for testing.
//!
//! Replies are served in order, one per `complete` call, without any
//! network access. Every request is recorded for later inspection.

use super::{CompletionGateway, CompletionRequest};
use crate::error::{Result, ToolCallError};
use crate::types::{Completion, ToolCallProposal};
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Completion),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text reply.
    pub fn reply_text(self, content: &str) -> Self {
        self.push(Scripted::Reply(Completion {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }))
    }

    /// Queue a reply proposing the given calls.
    pub fn reply_calls(self, tool_calls: Vec<ToolCallProposal>) -> Self {
        self.push(Scripted::Reply(Completion {
            content: None,
            tool_calls,
        }))
    }

    /// Queue a gateway failure.
    pub fn fail(self, message: &str) -> Self {
        self.push(Scripted::Fail(message.to_string()))
    }

    fn push(self, item: Scripted) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Build a proposal from a JSON object literal.
pub fn proposal(call_id: &str, name: &str, arguments: Value) -> ToolCallProposal {
    ToolCallProposal {
        call_id: call_id.to_string(),
        name: name.to_string(),
        arguments: match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(Scripted::Reply(completion)) => Ok(completion),
            Some(Scripted::Fail(message)) => Err(ToolCallError::Gateway(anyhow!(message))),
            None => Err(ToolCallError::Gateway(anyhow!("Scripted gateway exhausted"))),
        }
    }
}
