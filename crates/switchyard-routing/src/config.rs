//! Routing config model and loader.
//!
//! A routing config names a default provider and maps provider names to
//! descriptors. Files are TOML:
//!
//! ```toml
//! default_provider = "acme"
//!
//! [providers.acme]
//! kind = "http"
//! base_url_env = "ACME_URL"
//! api_key_env = "ACME_KEY"
//! dimension = 256
//! ```

use crate::completion::RetryPolicy;
use crate::factory::DEFAULT_DIMENSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use switchyard_core::{SwitchyardError, SwitchyardResult};

/// Declarative routing configuration for one capability.
///
/// Compared as a whole: any difference between two loads, however small,
/// counts as a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Name of the provider that serves requests. Empty or absent disables routing.
    #[serde(default, alias = "defaultProvider")]
    pub default_provider: Option<String>,
    /// Provider descriptors keyed by provider name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderDescriptor>,
}

impl RoutingConfig {
    /// Returns the default provider's name and descriptor when it is usable.
    ///
    /// `None` when no default is set, the default names no provider, or the
    /// provider's kind is empty.
    pub fn default_descriptor(&self) -> Option<(&str, &ProviderDescriptor)> {
        let name = self.default_provider.as_deref().filter(|n| !n.is_empty())?;
        let descriptor = self.providers.get(name)?;
        if descriptor.kind.is_empty() {
            return None;
        }
        Some((name, descriptor))
    }
}

/// How to build and authenticate one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Factory selector. Empty means the provider is disabled.
    #[serde(default)]
    pub kind: String,
    /// Environment variable holding the provider's base URL.
    #[serde(default, alias = "baseURLEnvVar")]
    pub base_url_env: String,
    /// Environment variable holding the provider's API key.
    #[serde(default, alias = "apiKeyEnvVar")]
    pub api_key_env: String,
    /// Embedding dimension; zero or negative selects [`DEFAULT_DIMENSION`].
    #[serde(default)]
    pub dimension: i64,
    /// Model id, required by completion kinds.
    #[serde(default)]
    pub model: Option<String>,
    /// Model used by `embed` on OpenAI-compatible completion kinds.
    #[serde(default)]
    pub embedding_model: Option<String>,
    /// Completion token limit.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature for completion kinds.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Retry policy applied inside the built client.
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
}

impl ProviderDescriptor {
    /// Dimension to request, substituting the default for unset values.
    pub fn effective_dimension(&self) -> usize {
        usize::try_from(self.dimension)
            .ok()
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DIMENSION)
    }
}

/// Parse a routing config from TOML text.
pub fn parse_routing_config(content: &str) -> SwitchyardResult<RoutingConfig> {
    toml::from_str(content)
        .map_err(|e| SwitchyardError::Config(format!("Failed to parse routing config: {e}")))
}

/// Read and parse a routing config file.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn load_routing_config(path: &Path) -> SwitchyardResult<Option<RoutingConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SwitchyardError::Config(format!(
                "Failed to read routing config '{}': {}",
                path.display(),
                e
            )))
        }
    };
    let config: RoutingConfig = toml::from_str(&content).map_err(|e| {
        SwitchyardError::Config(format!(
            "Failed to parse routing config '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(Some(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const ACME: &str = r#"
default_provider = "acme"

[providers.acme]
kind = "http"
base_url_env = "ACME_URL"
api_key_env = "ACME_KEY"
dimension = 256
"#;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_routing_config(ACME).unwrap();
        assert_eq!(config.default_provider.as_deref(), Some("acme"));
        let (name, desc) = config.default_descriptor().unwrap();
        assert_eq!(name, "acme");
        assert_eq!(desc.kind, "http");
        assert_eq!(desc.base_url_env, "ACME_URL");
        assert_eq!(desc.api_key_env, "ACME_KEY");
        assert_eq!(desc.effective_dimension(), 256);
        assert!(desc.retry.is_none());
    }

    #[test]
    fn test_parse_camel_case_aliases() {
        let config = parse_routing_config(
            r#"
defaultProvider = "acme"

[providers.acme]
kind = "http"
baseURLEnvVar = "ACME_URL"
apiKeyEnvVar = "ACME_KEY"
"#,
        )
        .unwrap();
        assert_eq!(config, {
            let mut expected = parse_routing_config(ACME).unwrap();
            expected.providers.get_mut("acme").unwrap().dimension = 0;
            expected
        });
    }

    #[test]
    fn test_default_dimension_for_unset_or_negative() {
        let mut desc = ProviderDescriptor::default();
        assert_eq!(desc.effective_dimension(), DEFAULT_DIMENSION);
        desc.dimension = -5;
        assert_eq!(desc.effective_dimension(), DEFAULT_DIMENSION);
        desc.dimension = 512;
        assert_eq!(desc.effective_dimension(), 512);
    }

    #[test]
    fn test_default_descriptor_unusable_cases() {
        // No default provider.
        let mut config = parse_routing_config(ACME).unwrap();
        config.default_provider = None;
        assert!(config.default_descriptor().is_none());

        // Empty default provider.
        config.default_provider = Some(String::new());
        assert!(config.default_descriptor().is_none());

        // Default names a provider that does not exist.
        config.default_provider = Some("missing".into());
        assert!(config.default_descriptor().is_none());

        // Disabled provider (empty kind).
        config.default_provider = Some("acme".into());
        config.providers.get_mut("acme").unwrap().kind.clear();
        assert!(config.default_descriptor().is_none());
    }

    #[test]
    fn test_parse_completion_descriptor_with_retry() {
        let config = parse_routing_config(
            r#"
default_provider = "main"

[providers.main]
kind = "openai"
base_url_env = "LLM_URL"
api_key_env = "LLM_KEY"
model = "gpt-4o-mini"
embedding_model = "text-embedding-3-large"
max_tokens = 1024

[providers.main.retry]
max_retries = 2
backoff_base_ms = 100
backoff_max_ms = 1000
"#,
        )
        .unwrap();
        let desc = &config.providers["main"];
        assert_eq!(desc.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(desc.embedding_model.as_deref(), Some("text-embedding-3-large"));
        assert_eq!(desc.max_tokens, Some(1024));
        assert_eq!(desc.retry.as_ref().unwrap().max_retries, 2);
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut()).unwrap();
        let config = load_routing_config(tmp.path()).unwrap().unwrap();
        assert_eq!(config, RoutingConfig::default());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut(), "{{{{invalid toml!!!!").unwrap();
        let err = load_routing_config(tmp.path()).unwrap_err();
        assert!(matches!(err, SwitchyardError::Config(_)));
        assert!(
            err.to_string().contains("Failed to parse routing config"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_load_nonexistent_file_is_none() {
        let result = load_routing_config(Path::new("/nonexistent/path/routing.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_deep_equality_detects_descriptor_change() {
        let a = parse_routing_config(ACME).unwrap();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.providers.get_mut("acme").unwrap().dimension = 512;
        assert_ne!(a, b);
    }
}
