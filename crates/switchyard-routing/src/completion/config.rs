use super::retry::RetryPolicy;
use crate::credentials::CredentialResolver;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use switchyard_core::SwitchyardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Claude,
    OpenAi,
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

impl LlmProvider {
    /// Whether the provider's backend implements `embed`.
    pub fn supports_embeddings(self) -> bool {
        !matches!(self, LlmProvider::Claude)
    }
}

impl FromStr for LlmProvider {
    type Err = SwitchyardError;

    /// Parses a routing descriptor `kind`.
    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind.to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(LlmProvider::Claude),
            "openai" => Ok(LlmProvider::OpenAi),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "groq" => Ok(LlmProvider::Groq),
            _ => Err(SwitchyardError::UnknownProviderKind(kind.to_string())),
        }
    }
}

/// Static configuration of a single completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: LlmProvider,
    pub model_id: String,
    #[serde(default)]
    pub api_key: String,
    /// Environment variable consulted when `api_key` is empty.
    #[serde(default)]
    pub api_key_env: Option<String>,
    pub api_base_url: Option<String>,
    /// Model used by `embed` on OpenAI-compatible providers.
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

impl ModelConfig {
    /// Minimal config with defaults for everything but provider and model.
    pub fn new(provider: LlmProvider, model_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            api_key: api_key.into(),
            api_key_env: None,
            api_base_url: None,
            embedding_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry_policy: None,
        }
    }

    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::Claude => "https://api.anthropic.com",
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }

    pub fn embedding_model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }

    /// Fill an empty `api_key` from `api_key_env`.
    pub fn with_credentials(mut self, resolver: &dyn CredentialResolver) -> Self {
        if self.api_key.is_empty() {
            if let Some(var) = &self.api_key_env {
                self.api_key = resolver.resolve(var);
            }
        }
        self
    }
}
