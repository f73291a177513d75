//! Vector store implementations

mod local;
mod registry;

pub use local::{IndexedChunk, LocalIndex, LocalVectorStore, INDEX_FILE_NAME};
pub use registry::LocalVectorStoreRegistry;
