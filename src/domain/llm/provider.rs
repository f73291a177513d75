use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;

use crate::domain::DomainError;

/// Stream of generated text fragments, in generation order
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Trait for generation engines (Ollama, hosted APIs, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Generate the full answer for a rendered prompt
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Generate an answer as a stream of fragments
    async fn complete_stream(&self, prompt: &str) -> Result<LlmStream, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
