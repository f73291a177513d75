//! Application state for shared services

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::infrastructure::semantic_cache::SemanticAnswerCache;
use crate::infrastructure::services::{AnsweringService, TestSynthesisService, WarmupService};

/// Services shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub answering: Arc<AnsweringService>,
    pub test_synthesis: Arc<TestSynthesisService>,
    pub warmup: Arc<WarmupService>,
    pub cache: Arc<SemanticAnswerCache>,
    /// Cancelled on server shutdown; request tokens are children of it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        answering: Arc<AnsweringService>,
        test_synthesis: Arc<TestSynthesisService>,
        warmup: Arc<WarmupService>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache: answering.cache().clone(),
            answering,
            test_synthesis,
            warmup,
            shutdown,
        }
    }
}
