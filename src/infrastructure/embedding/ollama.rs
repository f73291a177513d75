//! Ollama embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Ollama embedding provider (`POST /api/embed`)
#[derive(Debug)]
pub struct OllamaEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaEmbeddingProvider<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(client: C, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn embed_url(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OllamaEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let json = self.client.post_json(&self.embed_url(), &body).await?;
        let response: OllamaEmbedResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse embedding response: {}", e))
        })?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| DomainError::provider("ollama", "Empty embedding in response"))
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "http://localhost:11434/api/embed";

    #[tokio::test]
    async fn test_ollama_embed() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"model": "nomic-embed-text", "embeddings": [[0.1, 0.2, 0.3]]}),
        );
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        let vector = provider.embed("what is a controller?").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        let (_, body) = &provider.client.requests()[0];
        assert_eq!(body["input"], "what is a controller?");
        assert_eq!(body["model"], "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_ollama_embed_empty_response() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({"embeddings": []}));
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        assert!(provider.embed("x").await.is_err());
    }

    #[tokio::test]
    async fn test_ollama_embed_transport_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "connection refused");
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        let result = provider.embed("x").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
