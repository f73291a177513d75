//! Background cache warming
//!
//! After a project is indexed, answers a list of common questions in the
//! background so the first real users hit the cache.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::answering_service::{AnswerRequest, AnsweringService};
use crate::config::WarmupConfig;
use crate::domain::{validate_project_id, DomainError, PromptRepository};

/// Retrieval budget used for warm-up answers
const WARMUP_MAX_DOCS: usize = 5;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").unwrap());

/// Kind of project, selecting the bundled sample questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Java,
    React,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::React => "react",
        }
    }

    /// Name of the sample question resource next to the prompt templates
    pub fn sample_questions_name(&self) -> String {
        format!("sample_prompts_{}", self.as_str())
    }
}

/// Where warm-up questions come from
#[derive(Debug, Clone)]
pub enum WarmupSource {
    Questions(Vec<String>),
    Samples(ProjectKind),
}

/// Parse a sample question list: one question per line, blank lines and
/// `#` comments skipped, leading `N.` numbering removed.
pub fn parse_sample_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| LEADING_NUMBER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Outcome counts of one warm-up run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupSummary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct WarmupService {
    answering: Arc<AnsweringService>,
    prompts: Arc<dyn PromptRepository>,
    config: WarmupConfig,
    shutdown: CancellationToken,
}

impl WarmupService {
    pub fn new(
        answering: Arc<AnsweringService>,
        prompts: Arc<dyn PromptRepository>,
        config: WarmupConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            answering,
            prompts,
            config,
            shutdown,
        }
    }

    /// Start warming `project_id` in a detached task
    pub fn spawn(
        self: &Arc<Self>,
        project_id: impl Into<String>,
        source: WarmupSource,
    ) -> Result<JoinHandle<WarmupSummary>, DomainError> {
        let project_id = project_id.into();
        validate_project_id(&project_id)?;

        let service = Arc::clone(self);
        info!(project_id = %project_id, "Scheduled cache warm-up");

        Ok(tokio::spawn(async move {
            let delay = Duration::from_secs(service.config.start_delay_secs);
            tokio::select! {
                _ = service.shutdown.cancelled() => return WarmupSummary::default(),
                _ = tokio::time::sleep(delay) => {}
            }

            match service.run(&project_id, source).await {
                Ok(summary) => summary,
                Err(e) => {
                    error!(project_id = %project_id, error = %e, "Cache warm-up failed");
                    WarmupSummary::default()
                }
            }
        }))
    }

    async fn questions(&self, source: WarmupSource) -> Result<Vec<String>, DomainError> {
        match source {
            WarmupSource::Questions(questions) => Ok(questions),
            WarmupSource::Samples(kind) => {
                let name = kind.sample_questions_name();
                match self.prompts.load_text(&name).await? {
                    Some(text) => Ok(parse_sample_questions(&text)),
                    None => {
                        warn!(resource = %name, "Sample questions not found");
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    /// Answer every question, at most `workers` at a time
    pub async fn run(
        &self,
        project_id: &str,
        source: WarmupSource,
    ) -> Result<WarmupSummary, DomainError> {
        let questions = self.questions(source).await?;
        if questions.is_empty() {
            warn!(project_id = %project_id, "No warm-up questions, skipping");
            return Ok(WarmupSummary::default());
        }

        info!(project_id = %project_id, questions = questions.len(), "Starting cache warm-up");

        let permits = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks = JoinSet::new();

        for question in questions {
            let permits = permits.clone();
            let answering = self.answering.clone();
            let cancel = self.shutdown.child_token();
            let request = AnswerRequest::new(project_id, question)
                .with_max_docs(WARMUP_MAX_DOCS)
                .with_variant(answering.config().default_variant.clone());

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| DomainError::internal(e.to_string()))?;
                answer_fully(&answering, request, cancel).await
            });
        }

        let mut summary = WarmupSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => summary.succeeded += 1,
                Ok(Err(e)) => {
                    warn!(project_id = %project_id, error = %e, "Warm-up question failed");
                    summary.failed += 1;
                }
                Err(e) => {
                    error!(project_id = %project_id, error = %e, "Warm-up task panicked");
                    summary.failed += 1;
                }
            }
        }

        info!(
            project_id = %project_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Cache warm-up complete"
        );

        Ok(summary)
    }
}

/// Drain an answer so the orchestrator writes it to the cache
async fn answer_fully(
    answering: &AnsweringService,
    request: AnswerRequest,
    cancel: CancellationToken,
) -> Result<(), DomainError> {
    let question = request.question.clone();
    let mut fragments = answering.answer(request, cancel).await?;

    let mut chars = 0;
    while let Some(fragment) = fragments.next().await {
        chars += fragment?.chars().count();
    }

    debug!(question = %question, chars, "Warm-up answer complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnsweringConfig;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::prompt::MockPromptRepository;
    use crate::domain::vector_store::{MockVectorStore, MockVectorStoreRegistry};
    use crate::domain::{RetrievedDocument, SemanticCacheConfig};
    use crate::infrastructure::semantic_cache::{FileCachePersistence, SemanticAnswerCache};

    #[test]
    fn test_parse_sample_questions() {
        let text = "# Java samples\n1.Show me all REST API endpoints\n\n  2. List all service classes  \nWhat is 3.5?\n12.\n";

        assert_eq!(
            parse_sample_questions(text),
            vec![
                "Show me all REST API endpoints",
                "List all service classes",
                "What is 3.5?",
            ]
        );
    }

    async fn service(
        llm: MockLlmProvider,
        prompts: MockPromptRepository,
    ) -> (Arc<WarmupService>, Arc<SemanticAnswerCache>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(
            SemanticAnswerCache::open(
                SemanticCacheConfig::default(),
                Arc::new(FileCachePersistence::new(dir.path())),
                Arc::new(MockEmbeddingProvider::new(8)),
            )
            .await,
        );
        let prompts = Arc::new(prompts.with_template("code_prompt", "{context} {question}"));
        let store = MockVectorStore::new("shop")
            .with_documents(vec![RetrievedDocument::new("1", "class OrderController {}")]);
        let answering = AnsweringService::new(
            cache.clone(),
            prompts.clone(),
            Arc::new(MockVectorStoreRegistry::new().with_store(Arc::new(store))),
            Arc::new(llm),
            AnsweringConfig::default(),
        )
        .unwrap();

        let warmup = WarmupService::new(
            Arc::new(answering),
            prompts,
            WarmupConfig {
                workers: 2,
                start_delay_secs: 0,
            },
            CancellationToken::new(),
        );

        (Arc::new(warmup), cache, dir)
    }

    #[tokio::test]
    async fn test_warms_cache_from_sample_questions() {
        let prompts = MockPromptRepository::new().with_text(
            "sample_prompts_java",
            "1.Show me all REST API endpoints\n2.List all service classes\n",
        );
        let (warmup, cache, _dir) =
            service(MockLlmProvider::new().with_response("An answer."), prompts).await;

        let summary = warmup
            .spawn("shop", WarmupSource::Samples(ProjectKind::Java))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(summary, WarmupSummary { succeeded: 2, failed: 0 });
        assert_eq!(
            cache.check("shop", "show me all rest api endpoints").await.as_deref(),
            Some("An answer.")
        );
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let (warmup, _cache, _dir) = service(
            MockLlmProvider::new().with_error("engine down"),
            MockPromptRepository::new(),
        )
        .await;

        let summary = warmup
            .run(
                "shop",
                WarmupSource::Questions(vec!["one".to_string(), "two".to_string(), "three".to_string()]),
            )
            .await
            .unwrap();

        assert_eq!(summary, WarmupSummary { succeeded: 0, failed: 3 });
    }

    #[tokio::test]
    async fn test_missing_samples_skip_warmup() {
        let (warmup, _cache, _dir) =
            service(MockLlmProvider::new().with_response("x"), MockPromptRepository::new()).await;

        let summary = warmup
            .run("shop", WarmupSource::Samples(ProjectKind::React))
            .await
            .unwrap();

        assert_eq!(summary, WarmupSummary::default());
    }

    #[tokio::test]
    async fn test_invalid_project_is_rejected() {
        let (warmup, _cache, _dir) =
            service(MockLlmProvider::new(), MockPromptRepository::new()).await;

        let result = warmup.spawn("../x", WarmupSource::Questions(Vec::new()));

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
