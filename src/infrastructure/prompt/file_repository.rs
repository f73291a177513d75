//! Prompt templates read from `<prompt_dir>/<variant>.txt`

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::prompt::{PromptRepository, PromptTemplate, PromptVariant};
use crate::domain::DomainError;

const TEMPLATE_CACHE_CAPACITY: u64 = 10;

/// Parsed templates are memoized; edits to a template file need a restart
/// (or [`FilePromptRepository::invalidate_all`]) to take effect.
#[derive(Debug)]
pub struct FilePromptRepository {
    prompt_dir: PathBuf,
    templates: Cache<String, Arc<PromptTemplate>>,
}

impl FilePromptRepository {
    pub fn new(prompt_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt_dir: prompt_dir.into(),
            templates: Cache::builder()
                .max_capacity(TEMPLATE_CACHE_CAPACITY)
                .build(),
        }
    }

    pub fn invalidate_all(&self) {
        self.templates.invalidate_all();
    }

    fn template_path(&self, variant: &PromptVariant) -> PathBuf {
        self.prompt_dir.join(format!("{}.txt", variant))
    }
}

#[async_trait]
impl PromptRepository for FilePromptRepository {
    async fn load(&self, variant: &PromptVariant) -> Result<Arc<PromptTemplate>, DomainError> {
        if let Some(template) = self.templates.get(variant.as_str()).await {
            return Ok(template);
        }

        let path = self.template_path(variant);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::configuration(format!(
                    "Prompt template not found: {}",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(DomainError::configuration(format!(
                    "Failed to read prompt template {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let template = Arc::new(PromptTemplate::parse(content));
        tracing::debug!(variant = %variant, variables = ?template.variables(), "Loaded prompt template");

        self.templates
            .insert(variant.as_str().to_string(), template.clone())
            .await;

        Ok(template)
    }

    async fn load_text(&self, name: &str) -> Result<Option<String>, DomainError> {
        let variant = PromptVariant::new(name)?;

        match tokio::fs::read_to_string(self.template_path(&variant)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                name, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_load_and_render() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("code_prompt.txt"),
            "Context: {context}\nQ: {question}",
        )
        .unwrap();
        let repo = FilePromptRepository::new(dir.path());

        let template = repo
            .load(&PromptVariant::new("code_prompt").unwrap())
            .await
            .unwrap();
        let rendered = template
            .render(&HashMap::from([("context", "c"), ("question", "q")]))
            .unwrap();

        assert_eq!(rendered, "Context: c\nQ: q");
    }

    #[tokio::test]
    async fn test_templates_are_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code_prompt.txt");
        std::fs::write(&path, "first").unwrap();
        let repo = FilePromptRepository::new(dir.path());
        let variant = PromptVariant::new("code_prompt").unwrap();

        repo.load(&variant).await.unwrap();
        std::fs::write(&path, "second").unwrap();

        assert_eq!(repo.load(&variant).await.unwrap().content(), "first");

        repo.invalidate_all();
        assert_eq!(repo.load(&variant).await.unwrap().content(), "second");
    }

    #[tokio::test]
    async fn test_missing_template_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePromptRepository::new(dir.path());

        let result = repo.load(&PromptVariant::new("flowchart_prompt").unwrap()).await;

        let error = result.unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("flowchart_prompt.txt"));
    }

    #[tokio::test]
    async fn test_load_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample_prompts_java.txt"), "1. What is X?").unwrap();
        let repo = FilePromptRepository::new(dir.path());

        assert_eq!(
            repo.load_text("sample_prompts_java").await.unwrap().as_deref(),
            Some("1. What is X?")
        );
        assert_eq!(repo.load_text("sample_prompts_react").await.unwrap(), None);
    }
}
