//! Provider routing and failover for embedding and completion backends.
//!
//! A [`Router`] owns a declarative [`RoutingConfig`], lazily builds and
//! caches one client per provider name through a [`ClientFactory`], re-reads
//! its config file on every resolution to pick up changes without a restart,
//! and falls back to a secondary client when the default provider is
//! unconfigured or its call fails.
//!
//! Two routing instances are built from the same machinery:
//!
//! - [`EmbeddingRouter`]: routes `embed` calls to HTTP embedding providers,
//!   falling back to [`CompletionEmbedding`].
//! - [`CompletionRouter`]: routes `chat` calls to OpenAI-compatible or Claude
//!   backends, falling back to a statically configured [`LlmClient`].

/// Completion capability: backends, static client, retry wrapper, factory and router.
pub mod completion;
/// Routing config model and loader.
pub mod config;
/// Credential resolution from environment variable names.
pub mod credentials;
/// Embedding capability: HTTP provider, factory, fallback and router.
pub mod embedding;
/// Client factory seam shared by both capabilities.
pub mod factory;
/// Generic router with client cache and hot-reload.
pub mod router;

pub use completion::{
    CompletionFactory, CompletionRouter, LlmBackend, LlmClient, LlmProvider, ModelConfig,
    RetryPolicy, RetryingBackend,
};
pub use config::{load_routing_config, parse_routing_config, ProviderDescriptor, RoutingConfig};
pub use credentials::{CredentialResolver, EnvResolver, StaticResolver};
pub use embedding::{
    CompletionEmbedding, EmbeddingProvider, EmbeddingRouter, HttpEmbeddingFactory,
    HttpEmbeddingProvider,
};
pub use factory::{ClientFactory, ClientSpec, DEFAULT_DIMENSION};
pub use router::Router;
