//! Cache statistics

use serde::{Deserialize, Serialize};

/// Process-wide counters, persisted as `{hits, misses, evictions}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCounters {
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub misses: u64,
    #[serde(default)]
    pub evictions: u64,
}

impl CacheCounters {
    /// `hits / (hits + misses)`, or 0 before any lookup
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// How a cache lookup was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Exact,
    Semantic,
    Miss,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Semantic => "semantic",
            Self::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentQuestion {
    pub question: String,
    pub count: u64,
}

/// Statistics for one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCacheStats {
    pub project_id: String,
    pub cached_questions: usize,
    /// Percentage of the per-project capacity in use
    pub cache_utilization: f64,
    pub most_frequent_questions: Vec<FrequentQuestion>,
    pub hit_ratio: f64,
}

/// Statistics across all projects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalCacheStats {
    pub total_projects: usize,
    pub total_cached_questions: usize,
    pub embedding_cache_size: usize,
    pub hit_ratio: f64,
    pub counters: CacheCounters,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CacheStats {
    Project(ProjectCacheStats),
    Global(GlobalCacheStats),
}
