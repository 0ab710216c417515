//! The model endpoint adapter (spec §4.6, §9): a callable
//! `chat(messages, tools?, structured_schema?) -> message` treating the
//! generation model as two opaque endpoints — a tool-using chat endpoint
//! and a structured-output planner/verdict endpoint. The engine never
//! interprets model internals; this module only knows the wire shape.
//!
//! **(expansion)** Built on `reqwest` (already the teacher's dependency)
//! against an OpenAI-compatible chat-completions endpoint, mirroring the
//! Python original's direct `OpenAI().chat.completions.create(...)` usage
//! — this is new code grounded on the general reqwest-JSON-client shape
//! common across the example pack, since the teacher itself only spawns
//! CLI subprocesses and never calls a chat-completions endpoint directly.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skills_core::{Message, ToolCall, ToolRequest};

use crate::error::AdapterError;

/// A function-calling tool definition offered to the Optimizer/Evaluator,
/// derived from the Security Gateway's allow-list description.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A JSON-schema constraint for a structured-output request (the
/// Planner's Plan schema, or the Evaluator's Verdict schema).
#[derive(Debug, Clone, Serialize)]
pub struct StructuredSchema {
    pub name: String,
    pub schema: Value,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSpec>>,
    pub structured_schema: Option<StructuredSchema>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            structured_schema: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_structured_schema(mut self, schema: StructuredSchema) -> Self {
        self.structured_schema = Some(schema);
        self
    }
}

/// The model's response: either a chat message (possibly carrying tool
/// calls) or, for a structured-output request, a validated JSON value.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    Message(Message),
    Structured(Value),
}

#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, AdapterError>;
}

/// OpenAI-compatible chat-completions client.
pub struct HttpModelEndpoint {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model_name: String,
}

impl HttpModelEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model_name: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("reqwest client builds with static config"),
            base_url: base_url.into(),
            api_key,
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl ModelEndpoint for HttpModelEndpoint {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, AdapterError> {
        let wire_messages: Vec<WireMessage> = request
            .messages
            .iter()
            .filter_map(to_wire_message)
            .collect();

        let wire_tools = request.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(|tool| WireTool {
                    r#type: "function",
                    function: WireToolFunction {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect::<Vec<_>>()
        });

        let response_format = request.structured_schema.as_ref().map(|schema| {
            WireResponseFormat {
                r#type: "json_schema",
                json_schema: WireJsonSchema {
                    name: schema.name.clone(),
                    schema: schema.schema.clone(),
                },
            }
        });

        let body = WireChatRequest {
            model: &self.model_name,
            messages: wire_messages,
            tools: wire_tools,
            response_format,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AdapterError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Transport(format!("{status}: {body}")));
        }

        let parsed: WireChatResponse = response
            .json()
            .await
            .map_err(|err| AdapterError::Transport(err.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::Transport("empty choices array".to_string()))?;

        from_wire_response(choice.message, request.structured_schema.is_some())
    }
}

fn to_wire_message(message: &Message) -> Option<WireMessage> {
    match message {
        Message::System { content } => Some(WireMessage {
            role: "system",
            content: content.clone(),
            tool_calls: None,
            tool_call_id: None,
        }),
        Message::User { content } => Some(WireMessage {
            role: "user",
            content: content.clone(),
            tool_calls: None,
            tool_call_id: None,
        }),
        Message::Assistant { content, tool_calls } => Some(WireMessage {
            role: "assistant",
            content: content.clone(),
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls.iter().map(to_wire_tool_call).collect())
            },
            tool_call_id: None,
        }),
        Message::ToolResult { tool_call_id, content } => Some(WireMessage {
            role: "tool",
            content: content.clone(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
        }),
        // A tombstone never reaches the wire: L3 is reset before any
        // message referencing `Remove` would be serialized.
        Message::Remove => None,
    }
}

fn to_wire_tool_call(call: &ToolCall) -> WireToolCallOut {
    WireToolCallOut {
        id: call.id.clone(),
        r#type: "function",
        function: WireFunctionCallOut {
            name: tool_request_name(&call.request),
            arguments: serde_json::to_string(&call.request).unwrap_or_default(),
        },
    }
}

fn tool_request_name(request: &ToolRequest) -> String {
    match request {
        ToolRequest::Cli { tool_name, .. } => tool_name.clone(),
        ToolRequest::Script { script_name, .. } => script_name.clone(),
    }
}

fn from_wire_response(message: WireResponseMessage, structured: bool) -> Result<ChatOutcome, AdapterError> {
    if structured {
        let content = message.content.unwrap_or_default();
        let value: Value = serde_json::from_str(&content)
            .map_err(|err| AdapterError::SchemaViolation(err.to_string()))?;
        return Ok(ChatOutcome::Structured(value));
    }

    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .filter_map(|wire_call| {
            let request: ToolRequest = serde_json::from_str(&wire_call.function.arguments).ok()?;
            Some(ToolCall {
                id: wire_call.id,
                request,
            })
        })
        .collect::<Vec<_>>();

    let content = message.content.unwrap_or_default();
    if tool_calls.is_empty() {
        Ok(ChatOutcome::Message(Message::assistant_text(content)))
    } else {
        Ok(ChatOutcome::Message(Message::assistant_tool_calls(content, tool_calls)))
    }
}

#[derive(Serialize)]
struct WireChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCallOut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize)]
struct WireToolCallOut {
    id: String,
    r#type: &'static str,
    function: WireFunctionCallOut,
}

#[derive(Serialize)]
struct WireFunctionCallOut {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireToolFunction,
}

#[derive(Serialize)]
struct WireToolFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct WireResponseFormat {
    r#type: &'static str,
    json_schema: WireJsonSchema,
}

#[derive(Serialize)]
struct WireJsonSchema {
    name: String,
    schema: Value,
}

#[derive(Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[allow(dead_code)]
    role: Option<String>,
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCallIn>>,
}

#[derive(Deserialize)]
struct WireToolCallIn {
    id: String,
    function: WireFunctionCallIn,
}

#[derive(Deserialize)]
struct WireFunctionCallIn {
    #[allow(dead_code)]
    name: String,
    arguments: String,
}
