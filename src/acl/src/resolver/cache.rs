//! Memoization table for access decisions

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key: `(role name, resource)`
type CacheKey = (String, String);

/// Decision cache keyed by role name and resource
///
/// Entries live until [`clear`](Self::clear); there is no TTL and no eviction.
/// The cache cannot observe role or rule changes, so callers clear it after
/// mutating the resolver.
#[derive(Debug, Default)]
pub struct DecisionCache {
    /// Cached decisions (thread-safe)
    entries: DashMap<CacheKey, bool>,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached decision
    pub fn get(&self, role: &str, resource: &str) -> Option<bool> {
        let key = (role.to_string(), resource.to_string());

        match self.entries.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a decision
    pub fn put(&self, role: &str, resource: &str, allowed: bool) {
        self.entries
            .insert((role.to_string(), resource.to_string()), allowed);
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
