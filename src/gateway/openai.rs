//! Chat completions over the OpenAI-compatible HTTP API.
//!
//! Supports tool-use (function calling) in the `tools` / `tool_calls` format.

use super::{parse_arguments, CompletionGateway, CompletionRequest};
use crate::catalog::ToolSchema;
use crate::error::{Result, ToolCallError};
use crate::types::*;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// HTTP client for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    base_url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f64,
    http: reqwest::Client,
}

// -- Wire types --------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'static str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

impl<'a> MessagePayload<'a> {
    fn from_message(message: &'a ConversationMessage) -> Self {
        let mut payload = Self {
            role: message.role(),
            content: None,
            tool_calls: None,
            tool_call_id: None,
            name: None,
        };
        match message {
            ConversationMessage::System { content } | ConversationMessage::User { content } => {
                payload.content = Some(content.as_str());
            }
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => {
                payload.content = content.as_deref();
                if !tool_calls.is_empty() {
                    payload.tool_calls = Some(
                        tool_calls
                            .iter()
                            .map(|tc| ToolCallPayload {
                                id: tc.call_id.clone(),
                                kind: function_type(),
                                function: FunctionCallPayload {
                                    name: tc.name.clone(),
                                    arguments: serde_json::Value::Object(tc.arguments.clone())
                                        .to_string(),
                                },
                            })
                            .collect(),
                    );
                }
            }
            ConversationMessage::Tool {
                call_id,
                name,
                content,
            } => {
                payload.content = Some(content.as_str());
                payload.tool_call_id = Some(call_id.as_str());
                payload.name = Some(name.as_str());
            }
        }
        payload
    }
}

impl OpenAiGateway {
    /// Create a new gateway with default sampling settings.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(&self, request: &CompletionRequest) -> anyhow::Result<ChatResponse> {
        let tools = request.tools.as_deref();
        let body = ChatRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(MessagePayload::from_message)
                .collect(),
            tools,
            tool_choice: tools.map(|_| request.tool_choice),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Completion request to model {} ({} messages, {} tools)",
            request.model,
            request.messages.len(),
            tools.map_or(0, |t| t.len())
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Completion failed ({}): {}", status, body);
            return Err(anyhow!("Completion failed with status {}", status));
        }

        resp.json()
            .await
            .context("Failed to parse completion response")
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = self.send(request).await.map_err(ToolCallError::Gateway)?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ToolCallError::Gateway(anyhow!("Completion response has no choices")))?;

        let raw_calls = choice.message.tool_calls.unwrap_or_default();
        if request.tools.is_none() && !raw_calls.is_empty() {
            warn!(
                "Model proposed {} tool call(s) without a tool catalog; ignoring",
                raw_calls.len()
            );
            return Ok(Completion {
                content: choice.message.content,
                tool_calls: Vec::new(),
            });
        }

        let tool_calls = raw_calls
            .into_iter()
            .map(|tc| {
                Ok(ToolCallProposal {
                    arguments: parse_arguments(&tc.function.name, &tc.function.arguments)?,
                    call_id: tc.id,
                    name: tc.function.name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Completion returned {} tool call(s), content: {}",
            tool_calls.len(),
            choice.message.content.is_some()
        );

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_assistant_payload_reencodes_arguments() {
        let mut arguments = Map::new();
        arguments.insert("location".into(), json!("Beijing"));
        let msg = ConversationMessage::assistant(
            None,
            vec![ToolCallProposal {
                call_id: "call_9".into(),
                name: "get_rain_probability".into(),
                arguments,
            }],
        );

        let payload = serde_json::to_value(MessagePayload::from_message(&msg)).unwrap();
        assert_eq!(payload["role"], "assistant");
        assert_eq!(payload["content"], serde_json::Value::Null);
        assert_eq!(payload["tool_calls"][0]["id"], "call_9");
        assert_eq!(payload["tool_calls"][0]["type"], "function");
        assert_eq!(
            payload["tool_calls"][0]["function"]["arguments"],
            r#"{"location":"Beijing"}"#
        );
    }

    #[test]
    fn test_tool_payload_carries_call_id() {
        let msg = ConversationMessage::Tool {
            call_id: "call_9".into(),
            name: "get_rain_probability".into(),
            content: "40".into(),
        };
        let payload = serde_json::to_value(MessagePayload::from_message(&msg)).unwrap();
        assert_eq!(
            payload,
            json!({
                "role": "tool",
                "content": "40",
                "tool_call_id": "call_9",
                "name": "get_rain_probability"
            })
        );
    }

    #[test]
    fn test_no_tools_omits_tool_fields() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: Vec::new(),
            tools: None,
            tool_choice: None,
            max_tokens: 16,
            temperature: 0.0,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
    }

    #[test]
    fn test_tools_sent_as_given() {
        let element = json!({
            "type": "function",
            "function": { "name": "lookup_faq", "strict": true }
        });
        let tools = crate::catalog::parse_catalog(std::slice::from_ref(&element)).unwrap();
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: Vec::new(),
            tools: Some(tools.as_slice()),
            tool_choice: Some(ToolChoice::Auto),
            max_tokens: 16,
            temperature: 0.0,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["tools"], json!([element]));
        assert_eq!(value["tool_choice"], "auto");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gw = OpenAiGateway::new("https://api.example.com/v1/", "sk-test");
        assert_eq!(gw.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
