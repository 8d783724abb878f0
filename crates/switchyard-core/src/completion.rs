use crate::{Message, ToolCall, ToolSchema};
use serde::{Deserialize, Serialize};

/// Payload of a single completion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Optional system prompt, sent out-of-band where the provider supports it.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Conversation history, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Tools the model may call.
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
}

impl CompletionRequest {
    /// Creates a request holding a single user message.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            messages: vec![Message::user(prompt)],
            tools: Vec::new(),
        }
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Adds a tool the model may call.
    pub fn with_tool(mut self, tool: ToolSchema) -> Self {
        self.tools.push(tool);
        self
    }
}

/// Response from the LLM: either text content or a tool call request.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmResponse {
    /// Partial text; the model stopped for a reason other than end of turn.
    Text(String),
    /// The model requested one or more tool invocations.
    ToolUse {
        /// Text emitted alongside the tool calls, if any.
        content: Option<String>,
        /// Requested invocations.
        tool_calls: Vec<ToolCall>,
    },
    /// The model finished its turn.
    Done(String),
}

impl LlmResponse {
    /// Text content of the response, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            LlmResponse::Text(t) | LlmResponse::Done(t) => Some(t),
            LlmResponse::ToolUse { content, .. } => content.as_deref(),
        }
    }

    /// Whether this response carries no text and no tool calls.
    pub fn is_empty(&self) -> bool {
        match self {
            LlmResponse::Text(t) | LlmResponse::Done(t) => t.is_empty(),
            LlmResponse::ToolUse {
                content,
                tool_calls,
            } => tool_calls.is_empty() && content.as_deref().map_or(true, str::is_empty),
        }
    }
}
