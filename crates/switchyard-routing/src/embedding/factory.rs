use super::http::HttpEmbeddingProvider;
use super::EmbeddingProvider;
use crate::factory::{ClientFactory, ClientSpec};
use std::sync::Arc;
use switchyard_core::{SwitchyardError, SwitchyardResult};

/// Dimensions the HTTP embedding protocol accepts.
pub const SUPPORTED_DIMENSIONS: [usize; 4] = [128, 256, 512, 768];

/// Builds embedding providers from routing descriptors.
///
/// Only the `http` kind is defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEmbeddingFactory;

impl ClientFactory<dyn EmbeddingProvider> for HttpEmbeddingFactory {
    fn build(&self, spec: &ClientSpec) -> SwitchyardResult<Arc<dyn EmbeddingProvider>> {
        match spec.kind.as_str() {
            "http" => {
                if !SUPPORTED_DIMENSIONS.contains(&spec.dimension) {
                    return Err(SwitchyardError::Config(format!(
                        "embedding provider '{}' requests unsupported dimension {} (expected one of {:?})",
                        spec.name, spec.dimension, SUPPORTED_DIMENSIONS
                    )));
                }
                Ok(Arc::new(HttpEmbeddingProvider::new(
                    spec.base_url.clone(),
                    spec.api_key.clone(),
                    spec.dimension,
                )))
            }
            other => Err(SwitchyardError::UnknownProviderKind(other.to_string())),
        }
    }
}
