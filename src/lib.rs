//! Repository Q&A service
//!
//! Answers natural-language questions about indexed code repositories:
//! - Semantic answer cache with exact and similarity lookup per project
//! - Adaptive retrieval sizing and lexical reranking
//! - Streamed answers from a local Ollama engine, replayed from cache on hits
//! - Unit-test synthesis for feature branches

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use api::state::AppState;
use domain::embedding::EmbeddingProvider;
use infrastructure::embedding::{LazyEmbeddingProvider, OllamaEmbeddingProvider};
use infrastructure::llm::{HttpClient, OllamaLlmProvider, OllamaOptions};
use infrastructure::prompt::FilePromptRepository;
use infrastructure::semantic_cache::{FileCachePersistence, SemanticAnswerCache};
use infrastructure::services::{AnsweringService, TestSynthesisService, WarmupService};
use infrastructure::vector_store::LocalVectorStoreRegistry;

/// Wire every service from configuration.
///
/// `shutdown` is cancelled when the process stops; background work and
/// in-flight generations observe it.
pub async fn build_app_state(
    config: &AppConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<AppState> {
    let http = HttpClient::with_timeouts(
        Duration::from_secs(config.ollama.connect_timeout_secs),
        Duration::from_secs(config.ollama.read_timeout_secs),
    )?;

    let embedder: Arc<dyn EmbeddingProvider> = {
        let http = http.clone();
        let model = config.ollama.embedding_model.clone();
        let base_url = config.ollama.base_url.clone();
        Arc::new(LazyEmbeddingProvider::new(move || {
            Ok(Arc::new(OllamaEmbeddingProvider::with_base_url(
                http.clone(),
                model.clone(),
                base_url.clone(),
            )) as Arc<dyn EmbeddingProvider>)
        }))
    };

    let cache = Arc::new(
        SemanticAnswerCache::open(
            config.cache.clone(),
            Arc::new(FileCachePersistence::new(&config.cache.root_dir)),
            embedder.clone(),
        )
        .await,
    );

    let prompts = Arc::new(FilePromptRepository::new(&config.answering.prompt_dir));
    let stores = Arc::new(LocalVectorStoreRegistry::new(
        &config.retrieval.index_root,
        embedder,
        config.retrieval.max_open_stores,
    ));
    let llm = Arc::new(
        OllamaLlmProvider::with_base_url(http, &config.ollama.model, &config.ollama.base_url)
            .with_options(OllamaOptions {
                temperature: config.ollama.temperature,
                max_tokens: config.ollama.max_tokens,
            }),
    );

    let answering = Arc::new(AnsweringService::new(
        cache.clone(),
        prompts.clone(),
        stores.clone(),
        llm.clone(),
        config.answering.clone(),
    )?);
    let test_synthesis = Arc::new(TestSynthesisService::new(cache, prompts.clone(), stores, llm));
    let warmup = Arc::new(WarmupService::new(
        answering.clone(),
        prompts,
        config.warmup.clone(),
        shutdown.clone(),
    ));

    info!(
        model = %config.ollama.model,
        embedding_model = %config.ollama.embedding_model,
        index_root = %config.retrieval.index_root.display(),
        "Services initialized"
    );

    Ok(AppState::new(answering, test_synthesis, warmup, shutdown))
}
