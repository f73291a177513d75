//! Durable storage for the answer cache

use async_trait::async_trait;

use super::{CacheCounters, LruMap, ProjectCache};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Memoized question embeddings, oldest first
pub type EmbeddingMap = LruMap<Vec<f32>>;

/// Storage backend for cached answers, embeddings and counters.
///
/// Loads never fail on unreadable content: a corrupt blob is reported by the
/// implementation and treated as empty.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CachePersistence: Send + Sync {
    /// All persisted project caches
    async fn load_projects(&self) -> Result<Vec<(String, ProjectCache)>, DomainError>;

    /// Write the answers and frequencies of one project
    async fn save_project(&self, project_id: &str, cache: &ProjectCache) -> Result<(), DomainError>;

    async fn delete_project(&self, project_id: &str) -> Result<(), DomainError>;

    async fn load_embeddings(&self) -> Result<EmbeddingMap, DomainError>;

    async fn save_embeddings(&self, embeddings: &EmbeddingMap) -> Result<(), DomainError>;

    async fn delete_embeddings(&self) -> Result<(), DomainError>;

    async fn load_counters(&self) -> Result<CacheCounters, DomainError>;

    async fn save_counters(&self, counters: &CacheCounters) -> Result<(), DomainError>;

    /// Remove every persisted artifact
    async fn delete_all(&self) -> Result<(), DomainError>;
}
