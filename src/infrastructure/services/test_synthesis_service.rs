//! Unit-test synthesis from a feature branch
//!
//! Compares the chunks a feature branch indexed for one file with the chunks
//! of the base project and asks the engine for a unit test covering the
//! change.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::answering_service::render_prompt;
use crate::domain::{
    base_project_id, validate_project_id, DomainError, LlmProvider, OutputShape,
    PromptRepository, PromptVariant, RetrievedDocument, SearchParams, VectorStoreRegistry,
};
use crate::infrastructure::observability::{record_generation, GenerationMetricParams};
use crate::infrastructure::semantic_cache::SemanticAnswerCache;

const FEATURE_CHUNKS: usize = 100;
const BASE_CHUNKS: usize = 10;

/// A generated test for one target file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedTest {
    pub file: String,
    pub content: String,
}

/// Prompt template for a target file, chosen by extension
pub fn test_prompt_variant(target_file: &str) -> &'static str {
    if target_file.ends_with(".java") {
        "unit_test_java_prompt"
    } else if target_file.ends_with(".jsx") || target_file.ends_with(".tsx") {
        "unit_test_react_prompt"
    } else {
        "unit_test_prompt"
    }
}

fn join_chunks(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
pub struct TestSynthesisService {
    cache: Arc<SemanticAnswerCache>,
    prompts: Arc<dyn PromptRepository>,
    stores: Arc<dyn VectorStoreRegistry>,
    llm: Arc<dyn LlmProvider>,
}

impl TestSynthesisService {
    pub fn new(
        cache: Arc<SemanticAnswerCache>,
        prompts: Arc<dyn PromptRepository>,
        stores: Arc<dyn VectorStoreRegistry>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            cache,
            prompts,
            stores,
            llm,
        }
    }

    /// Generate (or fetch from the cache) a unit test for `target_file`.
    ///
    /// Returns `Ok(None)` when the base project has nothing for the file.
    #[instrument(skip(self))]
    pub async fn synthesize_test(
        &self,
        feature_id: &str,
        target_file: &str,
    ) -> Result<Option<SynthesizedTest>, DomainError> {
        validate_project_id(feature_id)?;
        let target_file = target_file.trim();
        if target_file.is_empty() {
            return Err(DomainError::validation("Target file must not be empty"));
        }

        if let Some(content) = self.cache.check(feature_id, target_file).await {
            info!("Returning cached unit test");
            return Ok(Some(SynthesizedTest {
                file: target_file.to_string(),
                content,
            }));
        }

        let base_id = base_project_id(feature_id);
        let (feature_store, base_store) = tokio::try_join!(
            self.stores.open(feature_id),
            self.stores.open(base_id)
        )?;

        let feature_docs = feature_store
            .search(SearchParams::new(target_file).with_top_k(FEATURE_CHUNKS))
            .await?;
        if feature_docs.is_empty() {
            return Err(DomainError::not_found(format!(
                "No feature chunks found for '{}'",
                target_file
            )));
        }

        let base_docs = base_store
            .search(SearchParams::new(target_file).with_top_k(BASE_CHUNKS))
            .await?;
        if base_docs.is_empty() {
            warn!(base_id = %base_id, "No base chunks found, skipping test generation");
            return Ok(None);
        }

        let variant = PromptVariant::new(test_prompt_variant(target_file))?;
        let template = self.prompts.load(&variant).await?;

        let feature_code = join_chunks(&feature_docs);
        let base_code = join_chunks(&base_docs);
        let values = HashMap::from([
            ("feature_code", feature_code.as_str()),
            ("base_code", base_code.as_str()),
        ]);
        let prompt = render_prompt(&template, &values)?;

        let started = Instant::now();
        let result = self.llm.complete(&prompt).await;
        record_generation(GenerationMetricParams {
            provider: self.llm.provider_name(),
            shape: OutputShape::Text,
            duration: started.elapsed(),
            success: result.is_ok(),
        });

        let content = result?.trim().to_string();
        self.cache.store(feature_id, target_file, &content).await;

        info!(
            variant = %variant,
            feature_chunks = feature_docs.len(),
            base_chunks = base_docs.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Generated unit test"
        );

        Ok(Some(SynthesizedTest {
            file: target_file.to_string(),
            content,
        }))
    }
}
