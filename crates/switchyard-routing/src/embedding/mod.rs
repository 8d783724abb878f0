mod fallback;
mod factory;
mod http;

pub use fallback::CompletionEmbedding;
pub use factory::{HttpEmbeddingFactory, SUPPORTED_DIMENSIONS};
pub use http::HttpEmbeddingProvider;

use crate::config::RoutingConfig;
use crate::credentials::CredentialResolver;
use crate::router::Router;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use switchyard_core::{EmbedType, SwitchyardResult};

/// Trait for computing text embeddings (vector representations).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute the embedding vector for a single text.
    async fn embed(&self, text: &str, kind: EmbedType) -> SwitchyardResult<Vec<f32>>;

    /// Compute embeddings for a batch of texts.
    async fn embed_batch(
        &self,
        texts: &[&str],
        kind: EmbedType,
    ) -> SwitchyardResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text, kind).await?);
        }
        Ok(results)
    }
}

/// Embedding routing instance.
///
/// Serves `embed` from the routing config's default provider, falling back
/// to the installed fallback provider. When nothing is configured and no
/// fallback is installed, `embed` succeeds with an empty vector instead of
/// failing; callers that need to detect total unavailability must check for
/// an empty result.
pub struct EmbeddingRouter {
    router: Router<dyn EmbeddingProvider>,
}

impl EmbeddingRouter {
    /// Wire a router with the built-in [`HttpEmbeddingFactory`].
    pub fn new(
        config: Option<RoutingConfig>,
        fallback: Option<Arc<dyn EmbeddingProvider>>,
        credentials: Arc<dyn CredentialResolver>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let mut router: Router<dyn EmbeddingProvider> =
            Router::new(config, Arc::new(HttpEmbeddingFactory), credentials);
        if let Some(fallback) = fallback {
            router = router.with_fallback(fallback);
        }
        if let Some(path) = config_path {
            router = router.with_config_path(path);
        }
        Self { router }
    }

    /// Wrap a router assembled by hand, e.g. with a custom factory.
    pub fn from_router(router: Router<dyn EmbeddingProvider>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router<dyn EmbeddingProvider> {
        &self.router
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingRouter {
    async fn embed(&self, text: &str, kind: EmbedType) -> SwitchyardResult<Vec<f32>> {
        let vector = self
            .router
            .call(move |provider| async move { provider.embed(text, kind).await })
            .await?;
        Ok(vector.unwrap_or_default())
    }
}
