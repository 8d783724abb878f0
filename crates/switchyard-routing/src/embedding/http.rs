use super::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use switchyard_core::{EmbedType, SwitchyardError, SwitchyardResult};

/// Embedding provider speaking the `POST {base}/embed` JSON protocol.
///
/// Holds no connection state beyond the pooled `reqwest` client, so a
/// discarded instance needs no explicit shutdown. Dropping an in-flight
/// `embed` future cancels the HTTP request.
pub struct HttpEmbeddingProvider {
    base_url: String,
    api_key: String,
    dimension: usize,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    #[serde(rename = "type")]
    kind: EmbedType,
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl HttpEmbeddingProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            dimension,
            http: reqwest::Client::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn endpoint(&self) -> String {
        format!("{}/embed", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str, kind: EmbedType) -> SwitchyardResult<Vec<f32>> {
        let body = EmbedRequest {
            input: text,
            kind,
            dimension: self.dimension,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SwitchyardError::Http(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SwitchyardError::Http(format!(
                "Embedding API error {status}: {error_body}"
            )));
        }

        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| SwitchyardError::Http(format!("Malformed embedding response: {e}")))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SwitchyardError::Http("Embedding response has no embeddings".into()))
    }
}
