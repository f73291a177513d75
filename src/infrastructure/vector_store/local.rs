//! File-backed vector store.
//!
//! Each project directory holds an `index.json` with pre-embedded chunks. The
//! whole index is loaded once per handle and searched by brute-force cosine
//! similarity against the embedded query.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider};
use crate::domain::vector_store::{RetrievedDocument, SearchParams, VectorStore};
use crate::domain::DomainError;

pub const INDEX_FILE_NAME: &str = "index.json";

/// One embedded chunk as written by the indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub embedding: Vec<f32>,
}

/// On-disk index layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalIndex {
    #[serde(default)]
    pub chunks: Vec<IndexedChunk>,
}

#[derive(Debug)]
pub struct LocalVectorStore {
    collection: String,
    index: LocalIndex,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl LocalVectorStore {
    pub fn new(
        collection: impl Into<String>,
        index: LocalIndex,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            collection: collection.into(),
            index,
            embedder,
        }
    }

    /// Load `<project_dir>/index.json`; a missing file means the project was
    /// never indexed.
    pub async fn open(
        collection: &str,
        project_dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let path = project_dir.join(INDEX_FILE_NAME);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::project_not_indexed(collection));
            }
            Err(e) => {
                return Err(DomainError::retrieval(format!(
                    "Failed to read index {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let index: LocalIndex = serde_json::from_slice(&raw).map_err(|e| {
            DomainError::retrieval(format!("Corrupt index {}: {}", path.display(), e))
        })?;

        tracing::info!(
            collection = %collection,
            chunks = index.chunks.len(),
            "Opened vector store"
        );

        Ok(Self::new(collection, index, embedder))
    }

    pub fn len(&self) -> usize {
        self.index.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.chunks.is_empty()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn search(&self, params: SearchParams) -> Result<Vec<RetrievedDocument>, DomainError> {
        if params.top_k == 0 || self.index.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(&params.query).await.map_err(|e| {
            DomainError::retrieval(format!("Failed to embed query: {}", e))
        })?;

        let mut scored: Vec<(f64, &IndexedChunk)> = self
            .index
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(&query, &chunk.embedding), chunk))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(params.top_k)
            .map(|(score, chunk)| {
                let doc = RetrievedDocument::new(&chunk.id, &chunk.content).with_score(score as f32);
                match chunk.source {
                    Some(ref source) => doc.with_source(source),
                    None => doc,
                }
            })
            .collect())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
