//! Application config (`switchyard.toml`).
//!
//! Points at the two routing files and optionally describes the static
//! completion client used as fallback for both capabilities.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use switchyard_routing::{CredentialResolver, ModelConfig};

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Routing file for embeddings, relative to the app config's directory.
    #[serde(default)]
    pub embedding_routing: Option<PathBuf>,
    /// Routing file for completions, relative to the app config's directory.
    #[serde(default)]
    pub completion_routing: Option<PathBuf>,
    #[serde(default)]
    pub model: Option<ModelConfig>,
}

impl AppConfig {
    /// Load from `path`. A missing file yields an empty config.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        };
        let mut config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", path.display(), e))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.embedding_routing = config.embedding_routing.map(|p| base.join(p));
        config.completion_routing = config.completion_routing.map(|p| base.join(p));
        Ok(config)
    }

    /// The static model config with its API key resolved.
    ///
    /// A model whose key is still empty afterwards is treated as absent.
    pub fn static_model(&self, resolver: &dyn CredentialResolver) -> Option<ModelConfig> {
        let model = self.model.clone()?.with_credentials(resolver);
        if model.api_key.is_empty() {
            return None;
        }
        Some(model)
    }
}
