//! Semantic answer cache domain models and traits
//!
//! Answers are cached per project under the normalized question. Lookups try
//! an exact key first, then compare question embeddings against the most
//! frequently asked cached questions.

mod config;
mod lru;
mod persistence;
mod project;
mod stats;

pub use config::SemanticCacheConfig;
pub use lru::LruMap;
pub use persistence::{CachePersistence, EmbeddingMap};
pub use project::ProjectCache;
pub use stats::{
    CacheCounters, CacheStats, FrequentQuestion, GlobalCacheStats, LookupOutcome,
    ProjectCacheStats,
};

#[cfg(test)]
pub use persistence::MockCachePersistence;

/// Cache key for a question: lowercased, surrounding whitespace removed.
/// Inner whitespace is kept as is.
pub fn normalize_question(question: &str) -> String {
    question.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_question() {
        assert_eq!(normalize_question("  What Is X?\n"), "what is x?");
        assert_eq!(normalize_question("a  b"), "a  b");
        assert_eq!(normalize_question("   "), "");
    }
}
