//! Semantic answer cache configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the semantic answer cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Directory holding answers, frequencies, embeddings and stats
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Maximum cached answers per project
    #[serde(default = "default_max_per_project")]
    pub max_per_project: usize,

    /// Maximum memoized question embeddings across all projects
    #[serde(default = "default_max_total_embeddings")]
    pub max_total_embeddings: usize,

    /// Cosine similarity at or above which a cached question matches
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Candidates compared per similarity lookup
    #[serde(default = "default_max_similarity_checks")]
    pub max_similarity_checks: usize,

    /// Below this many cached answers only exact matches are tried
    #[serde(default = "default_min_entries_for_similarity")]
    pub min_entries_for_similarity: usize,

    /// Extra entries dropped when a project cache overflows
    #[serde(default = "default_project_eviction_slack")]
    pub project_eviction_slack: usize,

    /// Extra entries dropped when the embedding cache overflows
    #[serde(default = "default_embedding_eviction_slack")]
    pub embedding_eviction_slack: usize,

    /// Persist the embedding cache whenever its size is a multiple of this
    #[serde(default = "default_embedding_flush_every")]
    pub embedding_flush_every: usize,

    /// Number of most frequent questions reported in project stats
    #[serde(default = "default_top_questions")]
    pub top_questions: usize,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./qa_cache_storage")
}

fn default_max_per_project() -> usize {
    300
}

fn default_max_total_embeddings() -> usize {
    3000
}

fn default_similarity_threshold() -> f64 {
    0.85
}

fn default_max_similarity_checks() -> usize {
    20
}

fn default_min_entries_for_similarity() -> usize {
    5
}

fn default_project_eviction_slack() -> usize {
    10
}

fn default_embedding_eviction_slack() -> usize {
    50
}

fn default_embedding_flush_every() -> usize {
    20
}

fn default_top_questions() -> usize {
    5
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            max_per_project: default_max_per_project(),
            max_total_embeddings: default_max_total_embeddings(),
            similarity_threshold: default_similarity_threshold(),
            max_similarity_checks: default_max_similarity_checks(),
            min_entries_for_similarity: default_min_entries_for_similarity(),
            project_eviction_slack: default_project_eviction_slack(),
            embedding_eviction_slack: default_embedding_eviction_slack(),
            embedding_flush_every: default_embedding_flush_every(),
            top_questions: default_top_questions(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_max_per_project(mut self, max: usize) -> Self {
        self.max_per_project = max;
        self
    }

    pub fn with_max_total_embeddings(mut self, max: usize) -> Self {
        self.max_total_embeddings = max;
        self
    }

    /// Set the similarity threshold, clamped to `[0, 1]`
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_similarity_checks(mut self, max: usize) -> Self {
        self.max_similarity_checks = max;
        self
    }

    pub fn with_eviction_slack(mut self, project: usize, embedding: usize) -> Self {
        self.project_eviction_slack = project;
        self.embedding_eviction_slack = embedding;
        self
    }

    /// Per-project capacity usage as a percentage
    pub fn utilization(&self, cached: usize) -> f64 {
        if self.max_per_project == 0 {
            return 0.0;
        }
        cached as f64 / self.max_per_project as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SemanticCacheConfig::default();

        assert_eq!(config.root_dir, PathBuf::from("./qa_cache_storage"));
        assert_eq!(config.max_per_project, 300);
        assert_eq!(config.max_total_embeddings, 3000);
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.max_similarity_checks, 20);
        assert_eq!(config.min_entries_for_similarity, 5);
        assert_eq!(config.project_eviction_slack, 10);
        assert_eq!(config.embedding_eviction_slack, 50);
        assert_eq!(config.embedding_flush_every, 20);
        assert_eq!(config.top_questions, 5);
    }

    #[test]
    fn test_config_builder() {
        let config = SemanticCacheConfig::new()
            .with_root_dir("/tmp/cache")
            .with_max_per_project(10)
            .with_max_total_embeddings(100)
            .with_similarity_threshold(1.5)
            .with_max_similarity_checks(3)
            .with_eviction_slack(1, 2);

        assert_eq!(config.root_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.max_per_project, 10);
        assert_eq!(config.max_total_embeddings, 100);
        assert_eq!(config.similarity_threshold, 1.0);
        assert_eq!(config.max_similarity_checks, 3);
        assert_eq!(config.project_eviction_slack, 1);
        assert_eq!(config.embedding_eviction_slack, 2);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: SemanticCacheConfig =
            serde_json::from_str(r#"{"max_per_project": 50}"#).unwrap();

        assert_eq!(config.max_per_project, 50);
        assert_eq!(config.similarity_threshold, 0.85);
    }

    #[test]
    fn test_utilization() {
        let config = SemanticCacheConfig::default();
        assert_eq!(config.utilization(150), 50.0);
        assert_eq!(config.with_max_per_project(0).utilization(3), 0.0);
    }
}
