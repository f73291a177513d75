//! JSON file persistence for the answer cache.
//!
//! Layout under the root directory:
//!
//! ```text
//! qa_responses/<project>.answers.json   ordered question -> answer
//! qa_responses/<project>.freq.json      question -> count
//! embeddings/embeddings.json            ordered text -> vector
//! cache_stats.json                      {hits, misses, evictions}
//! ```
//!
//! Every write goes to a temporary sibling first and is renamed into place,
//! so a crash never leaves a half-written file behind.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::semantic_cache::{
    CacheCounters, CachePersistence, EmbeddingMap, LruMap, ProjectCache,
};
use crate::domain::{validate_project_id, DomainError};

const RESPONSES_DIR: &str = "qa_responses";
const EMBEDDINGS_DIR: &str = "embeddings";
const EMBEDDINGS_FILE: &str = "embeddings.json";
const STATS_FILE: &str = "cache_stats.json";
const ANSWERS_SUFFIX: &str = ".answers.json";
const FREQUENCY_SUFFIX: &str = ".freq.json";

#[derive(Debug, Clone)]
pub struct FileCachePersistence {
    root: PathBuf,
}

impl FileCachePersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn responses_dir(&self) -> PathBuf {
        self.root.join(RESPONSES_DIR)
    }

    fn answers_path(&self, project_id: &str) -> PathBuf {
        self.responses_dir()
            .join(format!("{}{}", project_id, ANSWERS_SUFFIX))
    }

    fn frequency_path(&self, project_id: &str) -> PathBuf {
        self.responses_dir()
            .join(format!("{}{}", project_id, FREQUENCY_SUFFIX))
    }

    fn embeddings_path(&self) -> PathBuf {
        self.root.join(EMBEDDINGS_DIR).join(EMBEDDINGS_FILE)
    }

    fn stats_path(&self) -> PathBuf {
        self.root.join(STATS_FILE)
    }

    async fn load_project(&self, project_id: &str) -> Result<ProjectCache, DomainError> {
        let answers: LruMap<String> = read_json(&self.answers_path(project_id))
            .await?
            .unwrap_or_default();
        let frequency: HashMap<String, u64> = read_json(&self.frequency_path(project_id))
            .await?
            .unwrap_or_default();

        Ok(ProjectCache::from_parts(answers, frequency))
    }
}

/// Read and decode `path`. Missing files are `None`; undecodable content is
/// logged and also `None`.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt cache file");
            Ok(None)
        }
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DomainError> {
    let storage_err =
        |action: &str, e: std::io::Error| DomainError::storage(format!("Failed to {} {}: {}", action, path.display(), e));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_err("create directory for", e))?;
    }

    let bytes = serde_json::to_vec(value)
        .map_err(|e| DomainError::storage(format!("Failed to encode {}: {}", path.display(), e)))?;

    let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| storage_err("write", e))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(storage_err("replace", e));
    }

    Ok(())
}

async fn remove_file(path: &Path) -> Result<(), DomainError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomainError::storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn remove_dir(path: &Path) -> Result<(), DomainError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomainError::storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

#[async_trait]
impl CachePersistence for FileCachePersistence {
    async fn load_projects(&self) -> Result<Vec<(String, ProjectCache)>, DomainError> {
        let dir = self.responses_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to list {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut project_ids = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Stopped listing cached projects early");
                    break;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(project_id) = name.strip_suffix(ANSWERS_SUFFIX) {
                if validate_project_id(project_id).is_ok() {
                    project_ids.push(project_id.to_string());
                }
            }
        }
        project_ids.sort();

        let mut projects = Vec::with_capacity(project_ids.len());
        for project_id in project_ids {
            let cache = match self.load_project(&project_id).await {
                Ok(cache) => cache,
                Err(e) => {
                    tracing::warn!(project_id = %project_id, error = %e, "Unreadable project cache, starting empty");
                    ProjectCache::new()
                }
            };
            projects.push((project_id, cache));
        }

        Ok(projects)
    }

    async fn save_project(&self, project_id: &str, cache: &ProjectCache) -> Result<(), DomainError> {
        validate_project_id(project_id)?;

        write_json(&self.answers_path(project_id), cache.answers()).await?;
        write_json(&self.frequency_path(project_id), cache.frequency()).await
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), DomainError> {
        validate_project_id(project_id)?;

        remove_file(&self.answers_path(project_id)).await?;
        remove_file(&self.frequency_path(project_id)).await
    }

    async fn load_embeddings(&self) -> Result<EmbeddingMap, DomainError> {
        Ok(read_json(&self.embeddings_path()).await?.unwrap_or_default())
    }

    async fn save_embeddings(&self, embeddings: &EmbeddingMap) -> Result<(), DomainError> {
        write_json(&self.embeddings_path(), embeddings).await
    }

    async fn delete_embeddings(&self) -> Result<(), DomainError> {
        remove_file(&self.embeddings_path()).await
    }

    async fn load_counters(&self) -> Result<CacheCounters, DomainError> {
        Ok(read_json(&self.stats_path()).await?.unwrap_or_default())
    }

    async fn save_counters(&self, counters: &CacheCounters) -> Result<(), DomainError> {
        write_json(&self.stats_path(), counters).await
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        remove_dir(&self.responses_dir()).await?;
        remove_dir(&self.root.join(EMBEDDINGS_DIR)).await?;
        remove_file(&self.stats_path()).await
    }
}
