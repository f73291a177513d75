//! Domain layer - Core answering logic and entities

pub mod embedding;
pub mod error;
pub mod llm;
pub mod project;
pub mod prompt;
pub mod retrieval;
pub mod semantic_cache;
pub mod vector_store;

pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use error::DomainError;
pub use llm::{LlmProvider, LlmStream};
pub use project::{base_project_id, validate_project_id};
pub use prompt::{
    DiagramCleaner, OutputShape, PromptRepository, PromptTemplate, PromptVariant, TemplateError,
};
pub use retrieval::{rerank, size_retrieval, QuestionComplexity};
pub use semantic_cache::{
    normalize_question, CacheCounters, CachePersistence, CacheStats, LookupOutcome, ProjectCache,
    SemanticCacheConfig,
};
pub use vector_store::{RetrievedDocument, SearchParams, VectorStore, VectorStoreRegistry};
