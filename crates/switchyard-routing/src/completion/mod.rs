mod claude;
mod client;
mod config;
mod factory;
mod openai;
mod retry;

pub use claude::{parse_claude_response, ClaudeBackend};
pub use client::LlmClient;
pub use config::{LlmProvider, ModelConfig};
pub use factory::CompletionFactory;
pub use openai::{parse_openai_embedding, parse_openai_response, OpenAiBackend};
pub use retry::{is_retryable, RetryPolicy, RetryingBackend};

use crate::config::RoutingConfig;
use crate::credentials::CredentialResolver;
use crate::router::Router;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use switchyard_core::{CompletionRequest, LlmResponse, SwitchyardError, SwitchyardResult};

/// Trait for LLM provider backends.
///
/// Each provider wire protocol implements this trait. To add a provider:
/// implement `LlmBackend`, add a variant to [`LlmProvider`], and dispatch it
/// in [`LlmClient::new`].
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse>;

    /// Generic text embedding through the provider's embedding endpoint.
    ///
    /// Backends without one return [`SwitchyardError::Unsupported`].
    async fn embed(&self, _text: &str) -> SwitchyardResult<Vec<f32>> {
        Err(SwitchyardError::Unsupported(
            "this completion backend has no embedding endpoint".into(),
        ))
    }
}

/// Completion routing instance.
///
/// Serves `chat` from the routing config's default provider, falling back to
/// a statically configured client. When nothing is configured and no
/// fallback is installed, `chat` succeeds with an empty
/// `LlmResponse::Done("")` instead of failing; callers that need to detect
/// total unavailability must check [`LlmResponse::is_empty`].
pub struct CompletionRouter {
    router: Router<dyn LlmBackend>,
}

impl CompletionRouter {
    /// Wire a router with the built-in [`CompletionFactory`].
    pub fn new(
        config: Option<RoutingConfig>,
        fallback: Option<Arc<dyn LlmBackend>>,
        credentials: Arc<dyn CredentialResolver>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let mut router: Router<dyn LlmBackend> =
            Router::new(config, Arc::new(CompletionFactory), credentials);
        if let Some(fallback) = fallback {
            router = router.with_fallback(fallback);
        }
        if let Some(path) = config_path {
            router = router.with_config_path(path);
        }
        Self { router }
    }

    /// Wrap a router assembled by hand, e.g. with a custom factory.
    pub fn from_router(router: Router<dyn LlmBackend>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router<dyn LlmBackend> {
        &self.router
    }
}

#[async_trait]
impl LlmBackend for CompletionRouter {
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
        let response = self
            .router
            .call(move |backend| async move { backend.chat(request).await })
            .await?;
        Ok(response.unwrap_or_else(|| LlmResponse::Done(String::new())))
    }

    async fn embed(&self, text: &str) -> SwitchyardResult<Vec<f32>> {
        let vector = self
            .router
            .call(move |backend| async move { backend.embed(text).await })
            .await?;
        Ok(vector.unwrap_or_default())
    }
}
