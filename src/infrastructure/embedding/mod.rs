//! Embedding provider implementations

mod lazy;
mod ollama;

pub use lazy::LazyEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait};
