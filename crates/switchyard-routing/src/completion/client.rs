use super::claude::ClaudeBackend;
use super::config::{LlmProvider, ModelConfig};
use super::openai::OpenAiBackend;
use super::retry::RetryingBackend;
use super::LlmBackend;
use async_trait::async_trait;
use std::sync::Arc;
use switchyard_core::{CompletionRequest, LlmResponse, SwitchyardResult};

/// LLM client that dispatches to the correct provider backend.
///
/// Built once from a [`ModelConfig`]; serves as the completion router's
/// static fallback and as the client the completion factory hands out.
pub struct LlmClient {
    provider: LlmProvider,
    backend: Arc<dyn LlmBackend>,
}

impl LlmClient {
    pub fn new(config: ModelConfig) -> Self {
        let provider = config.provider;
        let retry_policy = config.retry_policy.clone();
        let backend: Arc<dyn LlmBackend> = match config.provider {
            LlmProvider::Claude => Arc::new(ClaudeBackend::new(config)),
            LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
                Arc::new(OpenAiBackend::new(config))
            }
        };
        let backend: Arc<dyn LlmBackend> = match retry_policy {
            Some(policy) => Arc::new(RetryingBackend::new(backend, policy)),
            None => backend,
        };
        Self { provider, backend }
    }

    /// Create from a pre-built backend (for custom/external providers).
    pub fn from_backend(provider: LlmProvider, backend: Arc<dyn LlmBackend>) -> Self {
        Self { provider, backend }
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
        self.backend.chat(request).await
    }

    async fn embed(&self, text: &str) -> SwitchyardResult<Vec<f32>> {
        self.backend.embed(text).await
    }
}
