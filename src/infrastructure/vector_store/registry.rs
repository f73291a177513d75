//! Memoizing registry of local vector stores

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use super::LocalVectorStore;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{VectorStore, VectorStoreRegistry};
use crate::domain::{validate_project_id, DomainError};

/// Opens `<index_root>/<project_id>/index.json` and keeps up to
/// `max_open_stores` handles, least recently used dropped first.
#[derive(Debug)]
pub struct LocalVectorStoreRegistry {
    index_root: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    handles: Cache<String, Arc<dyn VectorStore>>,
}

impl LocalVectorStoreRegistry {
    pub fn new(
        index_root: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
        max_open_stores: u64,
    ) -> Self {
        Self {
            index_root: index_root.into(),
            embedder,
            handles: Cache::builder().max_capacity(max_open_stores).build(),
        }
    }

    /// Forget a cached handle so the next `open` re-reads the index
    pub async fn invalidate(&self, project_id: &str) {
        self.handles.invalidate(project_id).await;
    }
}

#[async_trait]
impl VectorStoreRegistry for LocalVectorStoreRegistry {
    async fn open(&self, project_id: &str) -> Result<Arc<dyn VectorStore>, DomainError> {
        validate_project_id(project_id)?;

        if let Some(handle) = self.handles.get(project_id).await {
            return Ok(handle);
        }

        let project_dir = self.index_root.join(project_id);
        if !tokio::fs::try_exists(&project_dir).await.unwrap_or(false) {
            return Err(DomainError::project_not_indexed(project_id));
        }

        let store: Arc<dyn VectorStore> =
            Arc::new(LocalVectorStore::open(project_id, &project_dir, self.embedder.clone()).await?);

        self.handles
            .insert(project_id.to_string(), store.clone())
            .await;

        Ok(store)
    }
}
