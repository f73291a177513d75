//! Embedding provider built on first use

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

type ProviderFactory =
    Box<dyn Fn() -> Result<Arc<dyn EmbeddingProvider>, DomainError> + Send + Sync>;

/// Defers constructing the real provider until the first embedding request.
///
/// Concurrent first calls share a single initialization. A failed
/// initialization is not cached, so the next call tries again.
pub struct LazyEmbeddingProvider {
    factory: ProviderFactory,
    provider: OnceCell<Arc<dyn EmbeddingProvider>>,
}

impl LazyEmbeddingProvider {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EmbeddingProvider>, DomainError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            provider: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }

    async fn provider(&self) -> Result<&Arc<dyn EmbeddingProvider>, DomainError> {
        self.provider
            .get_or_try_init(|| async {
                tracing::debug!("Initializing embedding provider");
                (self.factory)()
            })
            .await
    }
}

impl fmt::Debug for LazyEmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEmbeddingProvider")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for LazyEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.provider().await?.embed(text).await
    }

    fn provider_name(&self) -> &'static str {
        match self.provider.get() {
            Some(provider) => provider.provider_name(),
            None => "lazy",
        }
    }
}
