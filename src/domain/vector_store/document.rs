use serde::{Deserialize, Serialize};

/// A code chunk returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Chunk identifier inside the collection
    pub id: String,
    /// Chunk text fed into the prompt context
    pub content: String,
    /// Similarity score assigned by the store (higher is closer)
    pub score: f32,
    /// Originating file, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RetrievedDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score: 0.0,
            source: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
