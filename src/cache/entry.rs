//! Cache Entry Module
//!
//! Defines a single cache slot holding a non-owning reference to a value.

use std::sync::{Arc, Weak};
use std::time::Instant;

// == Cache Entry ==
/// A cache slot that points at an externally owned value without keeping it alive.
///
/// The entry is considered expired once every `Arc` to the value has been
/// dropped. Expired entries are logically absent and are removed lazily by
/// the owning cache.
pub struct CacheEntry<V> {
    /// Non-owning reference to the cached value
    value: Weak<V>,
    /// When the entry was inserted
    created_at: Instant,
    /// When the entry was last inserted or successfully read
    last_accessed_at: Instant,
    /// Logical insertion order within the owning cache
    insert_seq: u64,
    /// Logical access order within the owning cache
    access_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry referring to `value`.
    ///
    /// # Arguments
    /// * `value` - The externally owned value; only a weak reference is kept
    /// * `seq` - The owning cache's logical clock at insertion time
    pub fn new(value: &Arc<V>, seq: u64) -> Self {
        let now = Instant::now();

        Self {
            value: Arc::downgrade(value),
            created_at: now,
            last_accessed_at: now,
            insert_seq: seq,
            access_seq: seq,
        }
    }

    // == Is Expired ==
    /// Returns `true` once no external owner holds the value anymore.
    pub fn is_expired(&self) -> bool {
        self.value.strong_count() == 0
    }

    // == Upgrade ==
    /// Resolves the entry to a strong reference, or `None` if it has expired.
    pub fn upgrade(&self) -> Option<Arc<V>> {
        self.value.upgrade()
    }

    // == Access ==
    /// Refreshes the access timestamp after a successful read.
    pub fn access(&mut self, seq: u64) {
        self.last_accessed_at = Instant::now().max(self.created_at);
        self.access_seq = seq;
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn insert_seq(&self) -> u64 {
        self.insert_seq
    }

    pub fn access_seq(&self) -> u64 {
        self.access_seq
    }

    // == Ordering Keys ==
    /// Ordering key for recency based policies.
    ///
    /// The logical sequence breaks ties between identical instants, so two
    /// accesses never compare equal.
    pub fn recency(&self) -> (Instant, u64) {
        (self.last_accessed_at, self.access_seq)
    }

    /// Ordering key for insertion based policies.
    pub fn age(&self) -> (Instant, u64) {
        (self.created_at, self.insert_seq)
    }
}

impl<V> std::fmt::Debug for CacheEntry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("expired", &self.is_expired())
            .field("created_at", &self.created_at)
            .field("last_accessed_at", &self.last_accessed_at)
            .field("insert_seq", &self.insert_seq)
            .field("access_seq", &self.access_seq)
            .finish()
    }
}
