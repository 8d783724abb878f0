use super::config::{LlmProvider, ModelConfig};
use super::LlmBackend;
use async_trait::async_trait;
use switchyard_core::{
    CompletionRequest, LlmResponse, Role, SwitchyardError, SwitchyardResult, ToolCall, ToolSchema,
};

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, OpenRouter, Groq, Ollama, and any other provider
/// that implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(&self, request: &CompletionRequest) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = &request.system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for m in &request.messages {
            let role = match m.role {
                Role::System => continue,
                Role::User | Role::Tool => "user",
                Role::Assistant => "assistant",
            };
            api_messages.push(serde_json::json!({
                "role": role,
                "content": m.content
            }));
        }

        api_messages
    }

    fn build_tools(&self, tools: &[ToolSchema]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters_schema,
                    }
                })
            })
            .collect()
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires extra headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "switchyard")
        } else {
            request
        }
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> SwitchyardResult<serde_json::Value> {
        let resp = self
            .add_provider_headers(self.http.post(url))
            .json(body)
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
                "OpenAI API error {status}: {text}"
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| SwitchyardError::Http(format!("Malformed OpenAI response: {e}")))
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": self.build_messages(request),
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(self.build_tools(&request.tools));
        }

        let resp_body = self.post_json(&url, &body).await?;
        parse_openai_response(&resp_body)
    }

    async fn embed(&self, text: &str) -> SwitchyardResult<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.config.base_url());
        let body = serde_json::json!({
            "model": self.config.embedding_model(),
            "input": text,
        });

        let resp_body = self.post_json(&url, &body).await?;
        parse_openai_embedding(&resp_body)
    }
}

pub fn parse_openai_response(body: &serde_json::Value) -> SwitchyardResult<LlmResponse> {
    let choice = &body["choices"][0];
    if choice.is_null() {
        return Err(SwitchyardError::Http(
            "Missing choices in OpenAI response".into(),
        ));
    }
    let message = &choice["message"];
    let content = message["content"].as_str().unwrap_or_default().to_string();

    if let Some(tool_calls_json) = message["tool_calls"].as_array() {
        let tool_calls: Vec<ToolCall> = tool_calls_json
            .iter()
            .filter_map(|tc| {
                let id = tc["id"].as_str()?.to_string();
                let name = tc["function"]["name"].as_str()?.to_string();
                let arguments: serde_json::Value =
                    serde_json::from_str(tc["function"]["arguments"].as_str()?).unwrap_or_default();
                Some(ToolCall {
                    id,
                    name,
                    arguments,
                })
            })
            .collect();

        Ok(LlmResponse::ToolUse {
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
            tool_calls,
        })
    } else {
        let finish_reason = choice["finish_reason"].as_str().unwrap_or("stop");
        if finish_reason == "stop" {
            Ok(LlmResponse::Done(content))
        } else {
            Ok(LlmResponse::Text(content))
        }
    }
}

/// Extract the first vector from an OpenAI `/v1/embeddings` response.
pub fn parse_openai_embedding(body: &serde_json::Value) -> SwitchyardResult<Vec<f32>> {
    let values = body["data"][0]["embedding"]
        .as_array()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SwitchyardError::Http("Missing embedding in OpenAI response".into()))?;

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| SwitchyardError::Http("Non-numeric embedding value".into()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use switchyard_core::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        let mut config = ModelConfig::new(LlmProvider::OpenAi, "gpt-4o-mini", "sk-test");
        config.api_base_url = Some(server.uri());
        OpenAiBackend::new(config)
    }

    #[test]
    fn test_parse_done_response() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}]
        });
        assert_eq!(parse_openai_response(&body).unwrap(), LlmResponse::Done("hi".into()));
    }

    #[test]
    fn test_parse_length_truncated_response() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "par"}, "finish_reason": "length"}]
        });
        assert_eq!(parse_openai_response(&body).unwrap(), LlmResponse::Text("par".into()));
    }

    #[test]
    fn test_parse_tool_calls() {
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "lookup", "arguments": "{\"q\":\"rust\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        match parse_openai_response(&body).unwrap() {
            LlmResponse::ToolUse {
                content,
                tool_calls,
            } => {
                assert!(content.is_none());
                assert_eq!(tool_calls.len(), 1);
                assert_eq!(tool_calls[0].name, "lookup");
                assert_eq!(tool_calls[0].arguments, serde_json::json!({"q": "rust"}));
            }
            other => panic!("Expected ToolUse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_choices_is_error() {
        assert!(parse_openai_response(&serde_json::json!({})).is_err());
    }

    #[test]
    fn test_parse_embedding() {
        let body = serde_json::json!({"data": [{"embedding": [0.5, -0.25]}]});
        assert_eq!(parse_openai_embedding(&body).unwrap(), vec![0.5f32, -0.25f32]);
        assert!(parse_openai_embedding(&serde_json::json!({"data": []})).is_err());
    }

    #[tokio::test]
    async fn test_chat_sends_bearer_and_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CompletionRequest {
            system_prompt: Some("Be brief.".into()),
            messages: vec![Message::system("dropped"), Message::user("hello")],
            tools: vec![],
        };
        let resp = backend_for(&server).chat(&request).await.unwrap();
        assert_eq!(resp, LlmResponse::Done("hi".into()));
    }

    #[tokio::test]
    async fn test_chat_error_status_includes_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .chat(&CompletionRequest::from_prompt("hello"))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("429"), "got: {msg}");
        assert!(msg.contains("slow down"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_embed_uses_embedding_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "input": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vector = backend_for(&server).embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.1f32, 0.2f32, 0.3f32]);
    }
}
