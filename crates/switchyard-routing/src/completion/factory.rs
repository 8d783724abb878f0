use super::client::LlmClient;
use super::config::{LlmProvider, ModelConfig};
use super::LlmBackend;
use crate::factory::{ClientFactory, ClientSpec};
use std::sync::Arc;
use switchyard_core::{SwitchyardError, SwitchyardResult};

/// Builds completion clients from routing descriptors.
///
/// The descriptor kind selects the wire protocol (`openai`, `openrouter`,
/// `groq`, `claude`); `model` is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionFactory;

impl ClientFactory<dyn LlmBackend> for CompletionFactory {
    fn build(&self, spec: &ClientSpec) -> SwitchyardResult<Arc<dyn LlmBackend>> {
        let provider: LlmProvider = spec.kind.parse()?;
        let model_id = spec.model.clone().filter(|m| !m.is_empty()).ok_or_else(|| {
            SwitchyardError::Config(format!(
                "completion provider '{}' has no model configured",
                spec.name
            ))
        })?;

        let mut config = ModelConfig::new(provider, model_id, spec.api_key.clone());
        config.api_base_url = Some(spec.base_url.clone());
        config.retry_policy = spec.retry.clone();
        config.embedding_model = spec.embedding_model.clone();
        if let Some(max_tokens) = spec.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = spec.temperature {
            config.temperature = temperature;
        }

        Ok(Arc::new(LlmClient::new(config)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ProviderDescriptor;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec(kind: &str, model: Option<&str>) -> ClientSpec {
        let descriptor = ProviderDescriptor {
            kind: kind.into(),
            model: model.map(String::from),
            ..Default::default()
        };
        ClientSpec::from_descriptor("main", &descriptor, "http://x", "k")
    }

    #[test]
    fn test_builds_known_kinds() {
        for kind in ["openai", "openrouter", "groq", "claude"] {
            assert!(CompletionFactory.build(&spec(kind, Some("m"))).is_ok(), "{kind}");
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = CompletionFactory.build(&spec("http", Some("m"))).err().unwrap();
        assert!(matches!(err, SwitchyardError::UnknownProviderKind(k) if k == "http"));
    }

    #[test]
    fn test_missing_model_is_config_error() {
        let err = CompletionFactory.build(&spec("openai", None)).err().unwrap();
        assert!(matches!(err, SwitchyardError::Config(ref m) if m.contains("main")));
        let err = CompletionFactory.build(&spec("openai", Some(""))).err().unwrap();
        assert!(matches!(err, SwitchyardError::Config(_)));
    }

    #[tokio::test]
    async fn test_embedding_model_reaches_built_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-large",
                "input": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.25]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let descriptor = ProviderDescriptor {
            kind: "openai".into(),
            model: Some("gpt-4o-mini".into()),
            embedding_model: Some("text-embedding-3-large".into()),
            ..Default::default()
        };
        let spec = ClientSpec::from_descriptor("main", &descriptor, server.uri(), "k");
        let client = CompletionFactory.build(&spec).unwrap();
        assert_eq!(client.embed("hello").await.unwrap(), vec![0.25]);
    }
}
