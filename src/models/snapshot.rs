//! Cache snapshot report
//!
//! A point-in-time view of the cache's bookkeeping, rendered as JSON for logs.

use serde::Serialize;

use crate::cache::{CacheStats, EvictionTrigger};

/// Point-in-time report of an `ObjectCache`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// Entries in the mapping, including stale ones not yet cleaned up
    pub size: usize,
    /// Entries whose value is still alive
    pub live: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Name of the installed eviction policy, if any
    pub policy: Option<&'static str>,
    /// When `put` evicts
    pub trigger: EvictionTrigger,
    /// Hit rate as a ratio between 0.0 and 1.0
    pub hit_rate: f64,
    /// Counters at the time of the snapshot
    pub stats: CacheStats,
    /// RFC 3339 capture time
    pub timestamp: String,
}

impl CacheSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(
        stats: CacheStats,
        live: usize,
        max_size: usize,
        policy: Option<&'static str>,
        trigger: EvictionTrigger,
    ) -> Self {
        Self {
            size: stats.total_entries,
            live,
            max_size,
            policy,
            trigger,
            hit_rate: stats.hit_rate(),
            stats,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Entries that are still in the mapping but whose value has been dropped.
    pub fn stale(&self) -> usize {
        self.size.saturating_sub(self.live)
    }
}
