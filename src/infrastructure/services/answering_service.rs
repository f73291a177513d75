//! Answering orchestrator
//!
//! Serves a question from the semantic cache when possible, replaying the
//! cached answer in paced fragments. Otherwise it loads the prompt template and
//! the project's vector store concurrently, retrieves and re-ranks context,
//! renders the prompt and generates the answer, streaming fragments to the
//! caller while accumulating them for the cache write.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{stream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AnsweringConfig;
use crate::domain::{
    rerank, size_retrieval, validate_project_id, DiagramCleaner, DomainError, LlmProvider,
    LlmStream, OutputShape, PromptRepository, PromptTemplate, PromptVariant, RetrievedDocument,
    SearchParams, VectorStoreRegistry,
};
use crate::infrastructure::observability::{record_generation, GenerationMetricParams};
use crate::infrastructure::semantic_cache::SemanticAnswerCache;

/// Answer fragments in emission order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// A question about one indexed project
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub project_id: String,
    pub question: String,
    /// Retrieval budget; the configured default when `None`
    pub max_docs: Option<usize>,
    /// Prompt variant; the configured default when `None`
    pub variant: Option<String>,
}

impl AnswerRequest {
    pub fn new(project_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            question: question.into(),
            max_docs: None,
            variant: None,
        }
    }

    pub fn with_max_docs(mut self, max_docs: usize) -> Self {
        self.max_docs = Some(max_docs);
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

/// Split `text` into fragments of at most `size` characters
pub fn split_fragments(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Join retrieved documents into the `{context}` prompt variable
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub(crate) fn render_prompt(
    template: &PromptTemplate,
    values: &HashMap<&str, &str>,
) -> Result<String, DomainError> {
    template
        .render(values)
        .map_err(|e| DomainError::configuration(format!("Invalid prompt template: {}", e)))
}

pub struct AnsweringService {
    cache: Arc<SemanticAnswerCache>,
    prompts: Arc<dyn PromptRepository>,
    stores: Arc<dyn VectorStoreRegistry>,
    llm: Arc<dyn LlmProvider>,
    config: AnsweringConfig,
    cleaner: DiagramCleaner,
}

impl std::fmt::Debug for AnsweringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsweringService")
            .field("llm", &self.llm.provider_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnsweringService {
    pub fn new(
        cache: Arc<SemanticAnswerCache>,
        prompts: Arc<dyn PromptRepository>,
        stores: Arc<dyn VectorStoreRegistry>,
        llm: Arc<dyn LlmProvider>,
        config: AnsweringConfig,
    ) -> Result<Self, DomainError> {
        let cleaner = DiagramCleaner::new(&config.diagram_keyword, &config.diagram_mode_token)?;

        Ok(Self {
            cache,
            prompts,
            stores,
            llm,
            config,
            cleaner,
        })
    }

    pub fn config(&self) -> &AnsweringConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SemanticAnswerCache> {
        &self.cache
    }

    pub fn output_shape(&self, variant: &PromptVariant) -> OutputShape {
        if self.config.is_diagram_variant(variant.as_str()) {
            OutputShape::Diagram
        } else {
            OutputShape::Text
        }
    }

    /// Answer a question as a stream of fragments.
    ///
    /// Validation, configuration and preparation errors are returned before
    /// any fragment. Errors during streamed generation end the stream with an
    /// `Err` item and leave the cache untouched. Cancelling `cancel` stops
    /// replay and generation at the next fragment boundary.
    #[instrument(skip(self, request, cancel), fields(project_id = %request.project_id))]
    pub async fn answer(
        &self,
        request: AnswerRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, DomainError> {
        validate_project_id(&request.project_id)?;

        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(DomainError::validation("Question must not be empty"));
        }

        let max_docs = request.max_docs.unwrap_or(self.config.default_max_docs);
        if max_docs == 0 {
            return Err(DomainError::validation("max_docs must be at least 1"));
        }

        let variant = PromptVariant::new(
            request
                .variant
                .unwrap_or_else(|| self.config.default_variant.clone()),
        )?;
        let shape = self.output_shape(&variant);
        let project_id = request.project_id;

        if let Some(answer) = self.cache.check(&project_id, &question).await {
            info!(variant = %variant, "Replaying cached answer");
            return Ok(self.replay(&answer, cancel));
        }

        let (template, store) = tokio::try_join!(
            self.prompts.load(&variant),
            self.stores.open(&project_id)
        )?;

        let doc_count = size_retrieval(&question, max_docs);
        let documents = store
            .search(SearchParams::new(question.as_str()).with_top_k(doc_count))
            .await?;
        let retrieved = documents.len();
        let documents = rerank(&question, documents, None);

        debug!(
            max_docs,
            doc_count,
            retrieved,
            kept = documents.len(),
            "Retrieved context"
        );

        let context = format_context(&documents);
        let values = HashMap::from([("context", context.as_str()), ("question", question.as_str())]);
        let prompt = render_prompt(&template, &values)?;

        match shape {
            OutputShape::Diagram => self.generate_diagram(project_id, question, prompt, cancel).await,
            OutputShape::Text => self.generate_text(project_id, question, prompt, cancel).await,
        }
    }

    /// Paced replay of a cached answer
    fn replay(&self, answer: &str, cancel: CancellationToken) -> FragmentStream {
        let fragments: VecDeque<String> =
            split_fragments(answer, self.config.replay_fragment_chars).into();
        let delay = Duration::from_millis(self.config.replay_delay_ms);

        let replay = stream::unfold(
            (fragments, false, cancel),
            move |(mut fragments, pause, cancel)| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                let fragment = fragments.pop_front()?;

                if pause {
                    tokio::select! {
                        _ = cancel.cancelled() => return None,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }

                Some((Ok::<_, DomainError>(fragment), (fragments, true, cancel)))
            },
        );

        Box::pin(replay)
    }

    async fn generate_diagram(
        &self,
        project_id: String,
        question: String,
        prompt: String,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, DomainError> {
        let started = Instant::now();

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Diagram generation cancelled");
                return Ok(Box::pin(stream::empty::<Result<String, DomainError>>()));
            }
            result = self.llm.complete(&prompt) => result,
        };

        record_generation(GenerationMetricParams {
            provider: self.llm.provider_name(),
            shape: OutputShape::Diagram,
            duration: started.elapsed(),
            success: result.is_ok(),
        });

        let raw = result.inspect_err(|e| error!(error = %e, "Diagram generation failed"))?;
        let diagram = self.cleaner.clean(&raw);

        self.cache.store(&project_id, &question, &diagram).await;
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            "Generated diagram answer"
        );

        Ok(Box::pin(stream::once(async move {
            Ok::<_, DomainError>(diagram)
        })))
    }

    async fn generate_text(
        &self,
        project_id: String,
        question: String,
        prompt: String,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, DomainError> {
        let started = Instant::now();
        let provider = self.llm.provider_name();

        let upstream = self.llm.complete_stream(&prompt).await.inspect_err(|e| {
            record_generation(GenerationMetricParams {
                provider,
                shape: OutputShape::Text,
                duration: started.elapsed(),
                success: false,
            });
            error!(error = %e, "Failed to start generation");
        })?;

        // Single slot: at most one fragment is produced ahead of the consumer.
        let (tx, rx) = mpsc::channel(1);
        let cache = self.cache.clone();

        tokio::spawn(async move {
            let outcome = forward_fragments(upstream, &tx, &cancel).await;

            record_generation(GenerationMetricParams {
                provider,
                shape: OutputShape::Text,
                duration: started.elapsed(),
                success: matches!(outcome, StreamOutcome::Completed(_)),
            });

            match outcome {
                StreamOutcome::Completed(answer) => {
                    cache.store(&project_id, &question, &answer).await;
                    info!(
                        project_id = %project_id,
                        duration_ms = started.elapsed().as_millis() as u64,
                        chars = answer.chars().count(),
                        "Generated answer"
                    );
                }
                StreamOutcome::Failed(e) => {
                    error!(project_id = %project_id, error = %e, "Generation failed mid-stream");
                    let _ = tx.send(Err(e)).await;
                }
                StreamOutcome::Cancelled => {
                    warn!(project_id = %project_id, "Generation cancelled, answer not cached");
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

enum StreamOutcome {
    Completed(String),
    Failed(DomainError),
    Cancelled,
}

/// Forward generated fragments to `tx` in order while accumulating the answer
async fn forward_fragments(
    mut upstream: LlmStream,
    tx: &mpsc::Sender<Result<String, DomainError>>,
    cancel: &CancellationToken,
) -> StreamOutcome {
    let mut answer = String::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamOutcome::Cancelled,
            next = upstream.next() => next,
        };

        let fragment = match next {
            Some(Ok(fragment)) => fragment,
            Some(Err(e)) => return StreamOutcome::Failed(e),
            None => return StreamOutcome::Completed(answer),
        };
        answer.push_str(&fragment);

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamOutcome::Cancelled,
            sent = tx.send(Ok(fragment)) => sent,
        };
        if sent.is_err() {
            // Receiver dropped: the client went away.
            return StreamOutcome::Cancelled;
        }
    }
}
