use crate::completion::RetryPolicy;
use crate::config::ProviderDescriptor;
use std::fmt;
use std::sync::Arc;
use switchyard_core::SwitchyardResult;

/// Embedding dimension used when a descriptor leaves it unset.
pub const DEFAULT_DIMENSION: usize = 768;

/// Everything a factory needs to build one client: the descriptor with its
/// credentials already resolved.
#[derive(Clone, PartialEq)]
pub struct ClientSpec {
    /// Provider name from the routing config.
    pub name: String,
    /// Factory selector.
    pub kind: String,
    /// Resolved base URL.
    pub base_url: String,
    /// Resolved API key.
    pub api_key: String,
    /// Effective embedding dimension.
    pub dimension: usize,
    /// Model id for completion kinds.
    pub model: Option<String>,
    /// Embedding model for completion kinds with an embedding endpoint.
    pub embedding_model: Option<String>,
    /// Completion token limit.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Retry policy the client applies to its own calls.
    pub retry: Option<RetryPolicy>,
}

impl ClientSpec {
    /// Combines a descriptor with resolved credentials.
    pub fn from_descriptor(
        name: impl Into<String>,
        descriptor: &ProviderDescriptor,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: descriptor.kind.clone(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            dimension: descriptor.effective_dimension(),
            model: descriptor.model.clone(),
            embedding_model: descriptor.embedding_model.clone(),
            max_tokens: descriptor.max_tokens,
            temperature: descriptor.temperature,
            retry: descriptor.retry.clone(),
        }
    }
}

// The API key never reaches logs.
impl fmt::Debug for ClientSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("dimension", &self.dimension)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Builds capability clients of type `C` from a [`ClientSpec`].
///
/// Must be a pure function of the spec: the router caches whatever it
/// returns and assumes an equal `ClientSpec` would produce an equivalent client.
/// New provider kinds are added as new match arms in an implementation,
/// never by changing the router.
pub trait ClientFactory<C: ?Sized>: Send + Sync {
    /// Build a client, failing with `UnknownProviderKind` for kinds this
    /// factory does not handle.
    fn build(&self, spec: &ClientSpec) -> SwitchyardResult<Arc<C>>;
}
