use super::config::ModelConfig;
use super::LlmBackend;
use async_trait::async_trait;
use serde::Serialize;
use switchyard_core::{CompletionRequest, LlmResponse, Role, SwitchyardError, SwitchyardResult, ToolCall};

/// Claude (Anthropic) API backend.
///
/// Has no embedding endpoint; `embed` reports `Unsupported`.
pub struct ClaudeBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> SwitchyardResult<serde_json::Value> {
        let api_messages: Vec<ClaudeMessage<'_>> = request
            .messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::System => return None,
                    Role::User | Role::Tool => "user",
                    Role::Assistant => "assistant",
                };
                Some(ClaudeMessage {
                    role,
                    content: &m.content,
                })
            })
            .collect();

        let claude_tools: Vec<ClaudeTool<'_>> = request
            .tools
            .iter()
            .map(|t| ClaudeTool {
                name: &t.name,
                description: &t.description,
                input_schema: &t.parameters_schema,
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": api_messages,
        });

        if let Some(sys) = &request.system_prompt {
            body["system"] = serde_json::json!(sys);
        }

        if !claude_tools.is_empty() {
            body["tools"] = serde_json::to_value(&claude_tools)?;
        }

        Ok(body)
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
        let url = format!("{}/v1/messages", self.config.base_url());
        let body = self.build_body(request)?;

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SwitchyardError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SwitchyardError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(SwitchyardError::Http(format!(
                "Claude API error {status}: {text}"
            )));
        }

        let resp_body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| SwitchyardError::Http(format!("Malformed Claude response: {e}")))?;
        parse_claude_response(&resp_body)
    }
}

// -- Claude wire types --

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

pub fn parse_claude_response(body: &serde_json::Value) -> SwitchyardResult<LlmResponse> {
    let content = body["content"]
        .as_array()
        .ok_or_else(|| SwitchyardError::Http("Missing content in Claude response".into()))?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in content {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(t) = block["text"].as_str() {
                    text_parts.push(t.to_string());
                }
            }
            Some("tool_use") => {
                tool_calls.push(ToolCall {
                    id: block["id"].as_str().unwrap_or_default().to_string(),
                    name: block["name"].as_str().unwrap_or_default().to_string(),
                    arguments: block["input"].clone(),
                });
            }
            _ => {}
        }
    }

    if !tool_calls.is_empty() {
        Ok(LlmResponse::ToolUse {
            content: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.join("\n"))
            },
            tool_calls,
        })
    } else {
        let stop_reason = body["stop_reason"].as_str().unwrap_or("end_turn");
        let text = text_parts.join("\n");
        if stop_reason == "end_turn" {
            Ok(LlmResponse::Done(text))
        } else {
            Ok(LlmResponse::Text(text))
        }
    }
}
