//! Cache administration types

use serde::{Deserialize, Serialize};

use crate::domain::semantic_cache::{CacheStats, FrequentQuestion};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheStatsQuery {
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub status: &'static str,
    pub stats: CacheStats,
}

/// Exactly one of the three targets should be set; `clear_all` wins, then
/// `clear_embeddings`, then `project_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub clear_embeddings: bool,
    #[serde(default)]
    pub clear_all: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedProjectsResponse {
    pub status: &'static str,
    pub projects: Vec<String>,
    pub total_projects: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrequentQuestionsQuery {
    #[serde(default = "default_frequent_limit")]
    pub limit: usize,
}

fn default_frequent_limit() -> usize {
    3
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequentQuestionsResponse {
    pub project_id: String,
    pub frequent_questions: Vec<FrequentQuestion>,
}
