//! Cache Statistics Module
//!
//! Tracks cache bookkeeping counters: hits, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing what the cache has done so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that resolved to a live value
    pub hits: u64,
    /// Reads for a missing or expired key
    pub misses: u64,
    /// Entries removed by the eviction policy or its fallback
    pub evictions: u64,
    /// Entries discarded because their value had been dropped
    pub expirations: u64,
    /// Entries currently in the mapping, expired or not
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expirations ==
    /// Adds `count` discarded stale entries.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
