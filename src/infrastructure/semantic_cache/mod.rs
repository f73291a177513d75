//! Semantic answer cache implementations

mod file_persistence;
mod service;

pub use file_persistence::FileCachePersistence;
pub use service::SemanticAnswerCache;
