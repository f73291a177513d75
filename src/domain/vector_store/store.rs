//! Vector store traits

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::RetrievedDocument;
use crate::domain::DomainError;

/// Search parameters for vector store queries
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Query text to search for
    pub query: String,
    /// Number of results to return
    pub top_k: usize,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: 5,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A searchable collection of embedded code chunks for one project
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Return up to `top_k` documents ranked by similarity to the query
    async fn search(&self, params: SearchParams) -> Result<Vec<RetrievedDocument>, DomainError>;

    /// Collection (project) identifier
    fn collection(&self) -> &str;
}

/// Opens vector store handles by project identifier
#[async_trait]
pub trait VectorStoreRegistry: Send + Sync + Debug {
    /// Fails with `DomainError::ProjectNotIndexed` when the project has no index
    async fn open(&self, project_id: &str) -> Result<Arc<dyn VectorStore>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub struct MockVectorStore {
        collection: String,
        documents: Vec<RetrievedDocument>,
        error: Option<String>,
        queries: Mutex<Vec<SearchParams>>,
    }

    impl MockVectorStore {
        pub fn new(collection: impl Into<String>) -> Self {
            Self {
                collection: collection.into(),
                documents: Vec::new(),
                error: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn with_documents(mut self, documents: Vec<RetrievedDocument>) -> Self {
            self.documents = documents;
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn queries(&self) -> Vec<SearchParams> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VectorStore for MockVectorStore {
        async fn search(
            &self,
            params: SearchParams,
        ) -> Result<Vec<RetrievedDocument>, DomainError> {
            let top_k = params.top_k;
            self.queries.lock().unwrap().push(params);

            if let Some(ref error) = self.error {
                return Err(DomainError::retrieval(error.clone()));
            }

            Ok(self.documents.iter().take(top_k).cloned().collect())
        }

        fn collection(&self) -> &str {
            &self.collection
        }
    }

    #[derive(Debug, Default)]
    pub struct MockVectorStoreRegistry {
        stores: HashMap<String, Arc<MockVectorStore>>,
    }

    impl MockVectorStoreRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_store(mut self, store: Arc<MockVectorStore>) -> Self {
            self.stores.insert(store.collection().to_string(), store);
            self
        }
    }

    #[async_trait]
    impl VectorStoreRegistry for MockVectorStoreRegistry {
        async fn open(&self, project_id: &str) -> Result<Arc<dyn VectorStore>, DomainError> {
            self.stores
                .get(project_id)
                .map(|store| store.clone() as Arc<dyn VectorStore>)
                .ok_or_else(|| DomainError::project_not_indexed(project_id))
        }
    }
}
