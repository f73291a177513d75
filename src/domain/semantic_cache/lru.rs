//! Access-ordered map used by both cache tiers.
//!
//! Entries live in an `IndexMap` ordered from least to most recently used;
//! touching an entry moves it to the back and eviction drains from the front.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LruMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for LruMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> LruMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Read without changing recency
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Read and mark as most recently used
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(idx, last);
        self.entries.get_index(last).map(|(_, v)| v)
    }

    /// Insert or overwrite; either way the key becomes most recently used
    pub fn insert(&mut self, key: String, value: V) {
        self.entries.shift_remove(&key);
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Once above `capacity`, drop the `len - capacity + slack` oldest entries
    /// in one batch and return their keys (oldest first).
    pub fn evict_over(&mut self, capacity: usize, slack: usize) -> Vec<String> {
        if self.entries.len() <= capacity {
            return Vec::new();
        }

        let count = (self.entries.len() - capacity + slack).min(self.entries.len());
        self.entries.drain(..count).map(|(key, _)| key).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys and values from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

impl<V> FromIterator<(String, V)> for LruMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
