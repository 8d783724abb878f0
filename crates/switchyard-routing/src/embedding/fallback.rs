use super::EmbeddingProvider;
use crate::completion::LlmBackend;
use async_trait::async_trait;
use std::sync::Arc;
use switchyard_core::{EmbedType, SwitchyardResult};

/// Derives embeddings from a completion client's generic embedding endpoint.
///
/// The query/document hint is dropped: completion-model embedding APIs do
/// not distinguish the two, so both kinds of text get the same vector.
pub struct CompletionEmbedding {
    backend: Arc<dyn LlmBackend>,
}

impl CompletionEmbedding {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl EmbeddingProvider for CompletionEmbedding {
    async fn embed(&self, text: &str, _kind: EmbedType) -> SwitchyardResult<Vec<f32>> {
        self.backend.embed(text).await
    }
}
