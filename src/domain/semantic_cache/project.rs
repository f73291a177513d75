//! Per-project answer cache with access frequencies

use std::collections::HashMap;

use super::LruMap;

/// Answers for one project keyed by normalized question, plus how often each
/// question was asked or stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCache {
    answers: LruMap<String>,
    frequency: HashMap<String, u64>,
}

impl ProjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. Frequencies for questions that are no
    /// longer cached are dropped.
    pub fn from_parts(answers: LruMap<String>, mut frequency: HashMap<String, u64>) -> Self {
        frequency.retain(|question, _| answers.contains_key(question));
        Self { answers, frequency }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn answers(&self) -> &LruMap<String> {
        &self.answers
    }

    pub fn frequency(&self) -> &HashMap<String, u64> {
        &self.frequency
    }

    pub fn frequency_of(&self, question: &str) -> u64 {
        self.frequency.get(question).copied().unwrap_or(0)
    }

    /// Return the answer for `question`, marking it most recent and counting
    /// the access.
    pub fn hit(&mut self, question: &str) -> Option<String> {
        let answer = self.answers.get(question)?.clone();
        *self.frequency.entry(question.to_string()).or_insert(0) += 1;
        Some(answer)
    }

    /// Up to `limit` cached questions, most frequently used first. Questions
    /// with equal counts keep recency order (older first).
    pub fn similarity_candidates(&self, limit: usize) -> Vec<String> {
        let mut candidates: Vec<&String> = self.answers.keys().collect();
        candidates.sort_by(|a, b| self.frequency_of(b).cmp(&self.frequency_of(a)));
        candidates.into_iter().take(limit).cloned().collect()
    }

    pub fn insert(&mut self, question: String, answer: String) {
        *self.frequency.entry(question.clone()).or_insert(0) += 1;
        self.answers.insert(question, answer);
    }

    /// Batch-evict the oldest entries once above `capacity`; returns how many
    /// were removed.
    pub fn evict_over(&mut self, capacity: usize, slack: usize) -> usize {
        let removed = self.answers.evict_over(capacity, slack);
        for question in &removed {
            self.frequency.remove(question);
        }
        removed.len()
    }

    /// Most asked questions, highest count first
    pub fn top_questions(&self, limit: usize) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .answers
            .keys()
            .map(|question| (question.clone(), self.frequency_of(question)))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(questions: &[&str]) -> ProjectCache {
        let mut cache = ProjectCache::new();
        for q in questions {
            cache.insert(q.to_string(), format!("answer to {}", q));
        }
        cache
    }

    #[test]
    fn test_hit_counts_and_refreshes() {
        let mut cache = cache_with(&["a", "b"]);

        assert_eq!(cache.hit("a"), Some("answer to a".to_string()));
        assert_eq!(cache.frequency_of("a"), 2);
        assert_eq!(
            cache.answers().keys().collect::<Vec<_>>(),
            vec!["b", "a"]
        );
        assert_eq!(cache.hit("missing"), None);
        assert_eq!(cache.frequency_of("missing"), 0);
    }

    #[test]
    fn test_candidates_by_frequency_then_age() {
        let mut cache = cache_with(&["a", "b", "c", "d"]);
        cache.hit("c");
        cache.hit("c");
        cache.hit("b");

        // order after hits: a, d, c, b; counts a=1 d=1 c=3 b=2
        assert_eq!(cache.similarity_candidates(10), vec!["c", "b", "a", "d"]);
        assert_eq!(cache.similarity_candidates(2), vec!["c", "b"]);
    }

    #[test]
    fn test_eviction_drops_frequencies() {
        let mut cache = cache_with(&["a", "b", "c", "d"]);

        let removed = cache.evict_over(3, 1);

        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.frequency_of("a"), 0);
        assert!(!cache.frequency().contains_key("b"));
        assert_eq!(cache.frequency_of("c"), 1);
    }

    #[test]
    fn test_top_questions() {
        let mut cache = cache_with(&["a", "b", "c"]);
        cache.hit("b");

        let top = cache.top_questions(2);

        assert_eq!(top, vec![("b".to_string(), 2), ("a".to_string(), 1)]);
    }

    #[test]
    fn test_from_parts_drops_orphan_frequencies() {
        let answers: LruMap<String> = [("a".to_string(), "x".to_string())].into_iter().collect();
        let frequency = HashMap::from([("a".to_string(), 4), ("gone".to_string(), 9)]);

        let cache = ProjectCache::from_parts(answers, frequency);

        assert_eq!(cache.frequency_of("a"), 4);
        assert_eq!(cache.frequency().len(), 1);
    }
}
