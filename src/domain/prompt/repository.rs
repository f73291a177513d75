//! Prompt template source

use std::sync::Arc;

use async_trait::async_trait;

use super::{PromptTemplate, PromptVariant};
use crate::domain::DomainError;

/// Loads prompt templates by variant name
#[async_trait]
pub trait PromptRepository: Send + Sync + std::fmt::Debug {
    /// Fails with `DomainError::Configuration` when the variant has no template
    async fn load(&self, variant: &PromptVariant) -> Result<Arc<PromptTemplate>, DomainError>;

    /// Raw text resource stored next to the templates (sample question lists)
    async fn load_text(&self, name: &str) -> Result<Option<String>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MockPromptRepository {
        templates: HashMap<String, String>,
        texts: HashMap<String, String>,
    }

    impl MockPromptRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_template(mut self, variant: impl Into<String>, content: impl Into<String>) -> Self {
            self.templates.insert(variant.into(), content.into());
            self
        }

        pub fn with_text(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
            self.texts.insert(name.into(), content.into());
            self
        }
    }

    #[async_trait]
    impl PromptRepository for MockPromptRepository {
        async fn load(&self, variant: &PromptVariant) -> Result<Arc<PromptTemplate>, DomainError> {
            self.templates
                .get(variant.as_str())
                .map(|content| Arc::new(PromptTemplate::parse(content.clone())))
                .ok_or_else(|| {
                    DomainError::configuration(format!("Prompt template '{}' not found", variant))
                })
        }

        async fn load_text(&self, name: &str) -> Result<Option<String>, DomainError> {
            Ok(self.texts.get(name).cloned())
        }
    }
}
