//! Adaptive retrieval: sizing the fetch and re-ranking what comes back

mod rerank;
mod sizing;

pub use rerank::{rerank, score_document, MAX_RERANKED_DOCS, RERANK_MIN_DOCS};
pub use sizing::{size_retrieval, QuestionComplexity};
