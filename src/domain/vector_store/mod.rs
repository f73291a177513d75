//! Vector store domain models and traits

mod document;
mod store;

pub use document::RetrievedDocument;
pub use store::{SearchParams, VectorStore, VectorStoreRegistry};

#[cfg(test)]
pub use store::mock::{MockVectorStore, MockVectorStoreRegistry};
