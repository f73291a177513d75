use std::collections::VecDeque;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::Deserialize;

use super::http_client::{ByteStream, HttpClientTrait};
use super::ndjson::NdjsonDecoder;
use crate::domain::{DomainError, LlmProvider, LlmStream};

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Sampling options forwarded to `/api/generate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OllamaOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_tokens: 1024,
        }
    }
}

/// Ollama generation engine
#[derive(Debug)]
pub struct OllamaLlmProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    options: OllamaOptions,
}

impl<C: HttpClientTrait> OllamaLlmProvider<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(client: C, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options: OllamaOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OllamaOptions) -> Self {
        self.options = options;
        self
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn build_request(&self, prompt: &str, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": stream,
            "options": {
                "temperature": self.options.temperature,
                "num_predict": self.options.max_tokens,
            }
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OllamaLlmProvider<C> {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let body = self.build_request(prompt, false);
        let json = self.client.post_json(&self.generate_url(), &body).await?;

        let response: OllamaGenerateChunk = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse response: {}", e))
        })?;

        if let Some(error) = response.error {
            return Err(DomainError::provider("ollama", error));
        }

        Ok(response.response)
    }

    async fn complete_stream(&self, prompt: &str) -> Result<LlmStream, DomainError> {
        let body = self.build_request(prompt, true);
        let byte_stream = self
            .client
            .post_json_stream(&self.generate_url(), &body)
            .await?;

        Ok(Box::pin(fragments(byte_stream)))
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

struct FragmentState {
    bytes: ByteStream,
    decoder: NdjsonDecoder,
    pending: VecDeque<Result<String, DomainError>>,
    finished: bool,
}

/// Turn the raw NDJSON body into text fragments. Stops at the `done` line or
/// the first error.
fn fragments(bytes: ByteStream) -> impl futures::Stream<Item = Result<String, DomainError>> + Send {
    let state = FragmentState {
        bytes,
        decoder: NdjsonDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            let lines = match state.bytes.next().await {
                Some(Ok(chunk)) => state.decoder.push(&chunk),
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(e));
                    continue;
                }
                None => {
                    state.finished = true;
                    state.decoder.finish().into_iter().collect()
                }
            };

            for line in lines {
                match parse_line(&line) {
                    Ok(chunk) => {
                        if !chunk.response.is_empty() {
                            state.pending.push_back(Ok(chunk.response));
                        }
                        if chunk.done {
                            state.finished = true;
                            break;
                        }
                    }
                    Err(error) => {
                        state.finished = true;
                        state.pending.push_back(Err(error));
                        break;
                    }
                }
            }
        }
    })
}

fn parse_line(line: &str) -> Result<OllamaGenerateChunk, DomainError> {
    let chunk: OllamaGenerateChunk = serde_json::from_str(line).map_err(|e| {
        DomainError::provider("ollama", format!("Malformed stream line: {}", e))
    })?;

    match chunk.error {
        Some(error) => Err(DomainError::provider("ollama", error)),
        None => Ok(chunk),
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use futures::TryStreamExt;

    const TEST_URL: &str = "http://localhost:11434/api/generate";

    #[tokio::test]
    async fn test_ollama_complete() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"model": "llama3.2", "response": "flowchart TD\nA-->B", "done": true}),
        );
        let provider = OllamaLlmProvider::new(client, "llama3.2:latest").with_options(OllamaOptions {
            temperature: 0.2,
            max_tokens: 64,
        });

        let text = provider.complete("draw it").await.unwrap();

        assert_eq!(text, "flowchart TD\nA-->B");
        let (_, body) = &provider.client.requests()[0];
        assert_eq!(body["model"], "llama3.2:latest");
        assert_eq!(body["prompt"], "draw it");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 64);
    }

    #[tokio::test]
    async fn test_ollama_complete_error_body() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({"error": "model not found"}));
        let provider = OllamaLlmProvider::new(client, "missing");

        let result = provider.complete("hi").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_ollama_stream_reassembles_lines() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![
                "{\"response\":\"The \",\"done\":false}\n{\"respo",
                "nse\":\"cache\",\"done\":false}\n",
                "{\"response\":\"\",\"done\":true}\n",
                "{\"response\":\"ignored\",\"done\":false}\n",
            ],
        );
        let provider = OllamaLlmProvider::with_base_url(client, "llama3.2", "http://localhost:11434/");

        let stream = provider.complete_stream("q").await.unwrap();
        let fragments: Vec<String> = stream.try_collect().await.unwrap();

        assert_eq!(fragments, vec!["The ", "cache"]);
        assert_eq!(provider.client.requests()[0].1["stream"], true);
    }

    #[tokio::test]
    async fn test_ollama_stream_error_line() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec!["{\"response\":\"partial\"}\n{\"error\":\"out of memory\"}\n"],
        );
        let provider = OllamaLlmProvider::new(client, "llama3.2");

        let items: Vec<Result<String, DomainError>> =
            provider.complete_stream("q").await.unwrap().collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_ollama_stream_without_trailing_newline() {
        let client = MockHttpClient::new()
            .with_stream_response(TEST_URL, vec!["{\"response\":\"last\",\"done\":true}"]);
        let provider = OllamaLlmProvider::new(client, "llama3.2");

        let fragments: Vec<String> = provider
            .complete_stream("q")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments, vec!["last"]);
    }
}
