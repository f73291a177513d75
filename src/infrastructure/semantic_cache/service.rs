//! Semantic answer cache service
//!
//! Holds one access-ordered answer map per project plus a global memo of
//! question embeddings. Lookups try the exact normalized question first and
//! fall back to embedding similarity against the most frequently asked cached
//! questions. Every store is written through to the persistence backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider};
use crate::domain::semantic_cache::{
    normalize_question, CacheCounters, CachePersistence, CacheStats, EmbeddingMap,
    FrequentQuestion, GlobalCacheStats, LookupOutcome, ProjectCache, ProjectCacheStats,
    SemanticCacheConfig,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_lookup, record_eviction};

type SharedProject = Arc<Mutex<ProjectCache>>;

pub struct SemanticAnswerCache {
    config: SemanticCacheConfig,
    persistence: Arc<dyn CachePersistence>,
    embedder: Arc<dyn EmbeddingProvider>,
    projects: RwLock<HashMap<String, SharedProject>>,
    embeddings: Mutex<EmbeddingMap>,
    /// Serializes embedding snapshots so files are written in order
    embeddings_writer: Mutex<()>,
    counters_writer: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl SemanticAnswerCache {
    /// Build the cache from whatever the persistence backend holds.
    ///
    /// Unreadable state is logged and replaced by an empty cache; opening
    /// never fails because of it.
    pub async fn open(
        config: SemanticCacheConfig,
        persistence: Arc<dyn CachePersistence>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let projects = persistence.load_projects().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load cached answers, starting empty");
            Vec::new()
        });
        let embeddings = persistence.load_embeddings().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load embedding cache, starting empty");
            EmbeddingMap::new()
        });
        let counters = persistence.load_counters().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load cache stats, starting from zero");
            CacheCounters::default()
        });

        info!(
            projects = projects.len(),
            cached_questions = projects.iter().map(|(_, p)| p.len()).sum::<usize>(),
            embeddings = embeddings.len(),
            "Semantic answer cache loaded"
        );

        let projects = projects
            .into_iter()
            .map(|(id, cache)| (id, Arc::new(Mutex::new(cache))))
            .collect();

        Self {
            config,
            persistence,
            embedder,
            projects: RwLock::new(projects),
            embeddings: Mutex::new(embeddings),
            embeddings_writer: Mutex::new(()),
            counters_writer: Mutex::new(()),
            hits: AtomicU64::new(counters.hits),
            misses: AtomicU64::new(counters.misses),
            evictions: AtomicU64::new(counters.evictions),
        }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    pub fn counters(&self) -> CacheCounters {
        CacheCounters {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    async fn project(&self, project_id: &str) -> Option<SharedProject> {
        self.projects.read().await.get(project_id).cloned()
    }

    async fn project_or_create(&self, project_id: &str) -> SharedProject {
        if let Some(project) = self.project(project_id).await {
            return project;
        }

        self.projects
            .write()
            .await
            .entry(project_id.to_string())
            .or_default()
            .clone()
    }

    /// Cached answer for `question`, exact or semantically similar
    pub async fn check(&self, project_id: &str, question: &str) -> Option<String> {
        let normalized = normalize_question(question);
        let (outcome, answer) = self.lookup(project_id, &normalized).await;

        record_cache_lookup(outcome);
        match outcome {
            LookupOutcome::Miss => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(project_id = %project_id, "Answer cache miss");
            }
            LookupOutcome::Exact | LookupOutcome::Semantic => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                info!(project_id = %project_id, outcome = outcome.as_str(), "Answer cache hit");
            }
        }

        answer
    }

    async fn lookup(&self, project_id: &str, normalized: &str) -> (LookupOutcome, Option<String>) {
        let Some(project) = self.project(project_id).await else {
            return (LookupOutcome::Miss, None);
        };

        let candidates = {
            let mut cache = project.lock().await;

            if let Some(answer) = cache.hit(normalized) {
                return (LookupOutcome::Exact, Some(answer));
            }
            if cache.len() < self.config.min_entries_for_similarity {
                return (LookupOutcome::Miss, None);
            }

            cache.similarity_candidates(self.config.max_similarity_checks)
        };

        // The project lock is released while embeddings are computed.
        let Some(query) = self.embedding(normalized).await else {
            return (LookupOutcome::Miss, None);
        };

        for candidate in candidates {
            let Some(vector) = self.embedding(&candidate).await else {
                continue;
            };

            let similarity = cosine_similarity(&query, &vector);
            if similarity < self.config.similarity_threshold {
                continue;
            }

            // Evicted or cleared since the candidates were taken: keep looking.
            if let Some(answer) = project.lock().await.hit(&candidate) {
                debug!(
                    project_id = %project_id,
                    similarity = format!("{:.4}", similarity),
                    matched = %candidate,
                    "Semantic match"
                );
                return (LookupOutcome::Semantic, Some(answer));
            }
        }

        (LookupOutcome::Miss, None)
    }

    /// Memoized embedding of `text`; `None` when the provider fails
    async fn embedding(&self, text: &str) -> Option<Vec<f32>> {
        if let Some(vector) = self.embeddings.lock().await.get(text) {
            return Some(vector.clone());
        }

        let vector = match self.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Failed to embed question, treating similarity as 0");
                return None;
            }
        };

        let flush = {
            let mut memo = self.embeddings.lock().await;
            memo.insert(text.to_string(), vector.clone());

            let evicted = memo
                .evict_over(
                    self.config.max_total_embeddings,
                    self.config.embedding_eviction_slack,
                )
                .len();
            if evicted > 0 {
                self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
                record_eviction("embedding", evicted);
                debug!(evicted, "Evicted embeddings");
            }

            let every = self.config.embedding_flush_every.max(1);
            evicted > 0 || memo.len() % every == 0
        };

        if flush {
            self.flush_embeddings().await;
        }

        Some(vector)
    }

    /// Cache `answer` for `question`, evicting and persisting as needed.
    /// Persistence failures are logged; the in-memory state stays current.
    pub async fn store(&self, project_id: &str, question: &str, answer: &str) {
        let normalized = normalize_question(question);

        loop {
            let project = self.project_or_create(project_id).await;
            let mut cache = project.lock().await;

            // Cleared while waiting for the lock: write into the fresh entry.
            if !self.is_current(project_id, &project).await {
                continue;
            }

            cache.insert(normalized, answer.to_string());

            let evicted = cache.evict_over(
                self.config.max_per_project,
                self.config.project_eviction_slack,
            );
            if evicted > 0 {
                self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
                record_eviction("project", evicted);
                info!(project_id = %project_id, evicted, "Evicted cached answers");
            }

            // Written under the project lock so saves land in order.
            if let Err(e) = self.persistence.save_project(project_id, &cache).await {
                warn!(project_id = %project_id, error = %e, "Failed to persist cached answers");
            }
            break;
        }

        self.flush_counters().await;
        debug!(project_id = %project_id, "Stored answer");
    }

    /// Whether `project` is still the live entry for `project_id`
    async fn is_current(&self, project_id: &str, project: &SharedProject) -> bool {
        self.projects
            .read()
            .await
            .get(project_id)
            .is_some_and(|live| Arc::ptr_eq(live, project))
    }

    async fn flush_embeddings(&self) {
        let _writer = self.embeddings_writer.lock().await;
        let snapshot = self.embeddings.lock().await.clone();

        if let Err(e) = self.persistence.save_embeddings(&snapshot).await {
            warn!(error = %e, "Failed to persist embedding cache");
        }
    }

    async fn flush_counters(&self) {
        let _writer = self.counters_writer.lock().await;
        let counters = self.counters();

        if let Err(e) = self.persistence.save_counters(&counters).await {
            warn!(error = %e, "Failed to persist cache stats");
        }
    }

    /// Drop one project's answers; `Ok(false)` when nothing was cached.
    ///
    /// The entry's lock is held while it is removed, and the files are
    /// deleted under the map lock, so a concurrent `store` either lands
    /// before the clear or in a fresh entry after it.
    pub async fn clear_project(&self, project_id: &str) -> Result<bool, DomainError> {
        loop {
            let current = self.project(project_id).await;
            let _cache = match current {
                Some(ref project) => Some(project.lock().await),
                None => None,
            };

            let mut projects = self.projects.write().await;
            let unchanged = match (&current, projects.get(project_id)) {
                (Some(project), Some(live)) => Arc::ptr_eq(project, live),
                (None, None) => true,
                _ => false,
            };
            if !unchanged {
                continue;
            }

            let existed = projects.remove(project_id).is_some();
            self.persistence.delete_project(project_id).await?;

            info!(project_id = %project_id, existed, "Cleared project cache");
            return Ok(existed);
        }
    }

    pub async fn clear_embeddings(&self) -> Result<(), DomainError> {
        let _writer = self.embeddings_writer.lock().await;
        self.embeddings.lock().await.clear();
        self.persistence.delete_embeddings().await?;

        info!("Cleared embedding cache");
        Ok(())
    }

    /// Drop everything, including the counters
    pub async fn clear_all(&self) -> Result<(), DomainError> {
        let _embeddings_writer = self.embeddings_writer.lock().await;
        let _counters_writer = self.counters_writer.lock().await;

        loop {
            let snapshot: Vec<SharedProject> =
                self.projects.read().await.values().cloned().collect();
            let mut guards = Vec::with_capacity(snapshot.len());
            for project in &snapshot {
                guards.push(project.lock().await);
            }

            let mut projects = self.projects.write().await;
            let unchanged = projects.len() == snapshot.len()
                && projects
                    .values()
                    .all(|live| snapshot.iter().any(|p| Arc::ptr_eq(p, live)));
            if !unchanged {
                continue;
            }

            projects.clear();
            self.embeddings.lock().await.clear();
            self.hits.store(0, Ordering::Relaxed);
            self.misses.store(0, Ordering::Relaxed);
            self.evictions.store(0, Ordering::Relaxed);

            self.persistence.delete_all().await?;
            break;
        }

        info!("Cleared all caches");
        Ok(())
    }

    /// Stats for one project, or global stats when `project_id` is `None`
    pub async fn stats(&self, project_id: Option<&str>) -> CacheStats {
        match project_id {
            Some(project_id) => CacheStats::Project(self.project_stats(project_id).await),
            None => CacheStats::Global(self.global_stats().await),
        }
    }

    /// Stats for one project; an unknown project reports zero entries
    pub async fn project_stats(&self, project_id: &str) -> ProjectCacheStats {
        let (cached, top) = match self.project(project_id).await {
            Some(project) => {
                let cache = project.lock().await;
                (cache.len(), cache.top_questions(self.config.top_questions))
            }
            None => (0, Vec::new()),
        };

        ProjectCacheStats {
            project_id: project_id.to_string(),
            cached_questions: cached,
            cache_utilization: self.config.utilization(cached),
            most_frequent_questions: top
                .into_iter()
                .map(|(question, count)| FrequentQuestion { question, count })
                .collect(),
            hit_ratio: self.counters().hit_ratio(),
        }
    }

    pub async fn global_stats(&self) -> GlobalCacheStats {
        let counters = self.counters();
        let projects: Vec<(String, SharedProject)> = self
            .projects
            .read()
            .await
            .iter()
            .map(|(id, project)| (id.clone(), project.clone()))
            .collect();

        let mut total_cached = 0;
        for (_, project) in &projects {
            total_cached += project.lock().await.len();
        }

        let mut ids: Vec<String> = projects.into_iter().map(|(id, _)| id).collect();
        ids.sort();

        GlobalCacheStats {
            total_projects: ids.len(),
            total_cached_questions: total_cached,
            embedding_cache_size: self.embeddings.lock().await.len(),
            hit_ratio: counters.hit_ratio(),
            counters,
            projects: ids,
        }
    }

    /// Identifiers of every project with cached state, sorted
    pub async fn project_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.projects.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Most asked questions for display, first letter upper-cased
    pub async fn frequent_questions(
        &self,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<FrequentQuestion>, DomainError> {
        let project = self.project(project_id).await.ok_or_else(|| {
            DomainError::not_found(format!("No cached questions for project '{}'", project_id))
        })?;

        let top = project.lock().await.top_questions(limit);
        if top.is_empty() {
            return Err(DomainError::not_found(format!(
                "No cached questions for project '{}'",
                project_id
            )));
        }

        Ok(top
            .into_iter()
            .map(|(question, count)| FrequentQuestion {
                question: capitalize_first(&question),
                count,
            })
            .collect())
    }

    /// Persist everything not yet written: access frequencies changed by
    /// hits, the embedding memo and the counters.
    pub async fn shutdown(&self) {
        let projects: Vec<(String, SharedProject)> = self
            .projects
            .read()
            .await
            .iter()
            .map(|(id, project)| (id.clone(), project.clone()))
            .collect();

        for (project_id, project) in projects {
            let cache = project.lock().await;
            if let Err(e) = self.persistence.save_project(&project_id, &cache).await {
                warn!(project_id = %project_id, error = %e, "Failed to persist cached answers");
            }
        }

        self.flush_embeddings().await;
        self.flush_counters().await;
        info!("Semantic answer cache flushed");
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Debug for SemanticAnswerCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticAnswerCache")
            .field("config", &self.config)
            .field("embedder", &self.embedder)
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}
