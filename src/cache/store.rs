//! Object Cache Module
//!
//! Main cache engine: a map of weak references with lazy expiry cleanup and
//! policy-driven eviction, guarded by a single lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::{
    CacheEntry, CacheStats, EvictionPolicy, EvictionTrigger, LruPolicy, DEFAULT_MAX_SIZE,
};
use crate::config::Config;
use crate::error::Result;
use crate::models::CacheSnapshot;

type BoxedPolicy<K, V> = Box<dyn EvictionPolicy<K, V>>;

// == Cache State ==
/// Everything protected by the cache lock.
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    policy: Option<BoxedPolicy<K, V>>,
    stats: CacheStats,
    /// Logical clock stamped on inserts and reads
    clock: u64,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();

        if removed > 0 {
            self.stats.record_expirations(removed);
            trace!(removed, "discarded expired entries");
        }
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Asks the policy for a victim, or drops the first entry if there is no policy.
    fn evict_one(&mut self) -> Option<K> {
        let evicted = match self.policy.as_mut() {
            Some(policy) => policy.evict(&mut self.entries),
            None => {
                let key = self.entries.keys().next().cloned()?;
                self.entries.remove(&key);
                Some(key)
            }
        };

        if evicted.is_some() {
            self.stats.record_eviction();
            debug!(
                policy = self.policy.as_ref().map_or("fallback", |p| p.name()),
                remaining = self.entries.len(),
                "evicted entry"
            );
        }
        evicted
    }
}

// == Object Cache ==
/// A bounded cache of non-owning references to externally owned values.
///
/// The cache never keeps a value alive. Once the last `Arc` to a value is
/// dropped, its entry is treated as absent and is discarded the next time
/// an operation notices it.
///
/// All operations take one exclusive lock, so they are linearizable per
/// instance. Eviction policies only ever run while that lock is held.
pub struct ObjectCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    max_size: usize,
    trigger: EvictionTrigger,
}

impl<K, V> ObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a cache holding at most `max_size` live entries, evicting by LRU.
    pub fn new(max_size: usize) -> Self {
        Self::with_policy(max_size, Some(Box::new(LruPolicy)))
    }

    /// Creates a cache with an explicit policy.
    ///
    /// Passing `None` is valid: eviction then removes an arbitrary entry.
    pub fn with_policy(max_size: usize, policy: Option<BoxedPolicy<K, V>>) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                policy,
                stats: CacheStats::new(),
                clock: 0,
            }),
            max_size,
            trigger: EvictionTrigger::default(),
        }
    }

    /// Builds a cache from configuration.
    ///
    /// # Errors
    /// Returns an error when the configuration does not validate or names an
    /// unknown policy.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let policy = config.policy()?.map(|kind| kind.build());
        Ok(Self::with_policy(config.max_size, policy).with_trigger(config.eviction_trigger))
    }

    /// Sets when `put` evicts. Defaults to [`EvictionTrigger::AtCapacity`].
    pub fn with_trigger(mut self, trigger: EvictionTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    // == Policy ==
    /// Replaces the eviction policy. Applies to subsequent evictions only.
    pub fn set_policy(&self, policy: BoxedPolicy<K, V>) {
        let mut state = self.state.lock();
        debug!(policy = policy.name(), "eviction policy replaced");
        state.policy = Some(policy);
    }

    /// Removes the eviction policy, leaving the arbitrary-entry fallback.
    pub fn clear_policy(&self) {
        self.state.lock().policy = None;
    }

    pub fn policy_name(&self) -> Option<&'static str> {
        self.state.lock().policy.as_ref().map(|p| p.name())
    }

    // == Put ==
    /// Stores a weak reference to `value` under `key`.
    ///
    /// Expired entries are cleaned up first. If the trigger calls for it, one
    /// entry is evicted before the insert. An existing entry for `key` is
    /// overwritten. The caller must keep its own `Arc` for the entry to stay
    /// resolvable.
    pub fn put(&self, key: K, value: &Arc<V>) {
        let mut state = self.state.lock();
        state.cleanup_expired();

        let should_evict = match self.trigger {
            EvictionTrigger::EveryInsert => true,
            EvictionTrigger::AtCapacity => {
                !state.entries.contains_key(&key) && state.entries.len() >= self.max_size
            }
        };
        if should_evict {
            state.evict_one();
        }

        let seq = state.tick();
        state.entries.insert(key, CacheEntry::new(value, seq));
        let len = state.entries.len();
        state.stats.set_total_entries(len);
    }

    // == Get ==
    /// Returns a strong reference to the value under `key`.
    ///
    /// Returns `None` if the key is absent or its value has been dropped; in
    /// the latter case the stale entry is removed. A hit refreshes the entry's
    /// access time.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(entry) = state.entries.get_mut(key) else {
            state.stats.record_miss();
            return None;
        };

        match entry.upgrade() {
            Some(value) => {
                state.clock += 1;
                entry.access(state.clock);
                state.stats.record_hit();
                Some(value)
            }
            None => {
                state.entries.remove(key);
                state.stats.record_expirations(1);
                state.stats.record_miss();
                let len = state.entries.len();
                state.stats.set_total_entries(len);
                None
            }
        }
    }

    // == Contains ==
    /// True iff `key` is present and its value is still alive.
    ///
    /// Does not refresh access time or remove stale entries.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Remove ==
    /// Removes `key`, returning its value if it was still alive.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        let removed = state.entries.remove(key);
        let len = state.entries.len();
        state.stats.set_total_entries(len);
        removed.and_then(|entry| entry.upgrade())
    }

    // == Cleanup Expired ==
    /// Removes every entry whose value has been dropped.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        self.state.lock().cleanup_expired()
    }

    // == Clear ==
    /// Removes all entries. Values are not affected.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.stats.set_total_entries(0);
    }

    // == Length ==
    /// Returns the number of entries in the mapping.
    ///
    /// Stale entries not yet cleaned up are included; call
    /// [`cleanup_expired`](Self::cleanup_expired) first for a live count.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn trigger(&self) -> EvictionTrigger {
        self.trigger
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Captures a serializable report of the cache's current bookkeeping.
    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.lock();
        let live = state
            .entries
            .values()
            .filter(|entry| !entry.is_expired())
            .count();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());

        CacheSnapshot::new(
            stats,
            live,
            self.max_size,
            state.policy.as_ref().map(|p| p.name()),
            self.trigger,
        )
    }
}

impl<K, V> Default for ObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl<K, V> fmt::Debug for ObjectCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ObjectCache")
            .field("len", &state.entries.len())
            .field("max_size", &self.max_size)
            .field("policy", &state.policy.as_ref().map(|p| p.name()))
            .field("trigger", &self.trigger)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FifoPolicy, MruPolicy, PolicyKind};
    use crate::error::CacheError;

    fn lru_cache(max_size: usize) -> ObjectCache<String, String> {
        ObjectCache::new(max_size)
    }

    fn value(s: &str) -> Arc<String> {
        Arc::new(s.to_string())
    }

    #[test]
    fn test_cache_new() {
        let cache = lru_cache(10);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.max_size(), 10);
        assert_eq!(cache.policy_name(), Some("lru"));
        assert_eq!(cache.trigger(), EvictionTrigger::AtCapacity);
    }

    #[test]
    fn test_default_capacity() {
        let cache: ObjectCache<String, String> = ObjectCache::default();
        assert_eq!(cache.max_size(), DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_put_and_get() {
        let cache = lru_cache(10);
        let v1 = value("one");

        cache.put("key1".to_string(), &v1);
        let got = cache.get("key1").unwrap();

        assert!(Arc::ptr_eq(&got, &v1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let cache = lru_cache(10);
        assert!(cache.get("nope").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_cache_does_not_own_values() {
        let cache = lru_cache(10);
        let v1 = value("one");

        cache.put("key1".to_string(), &v1);
        assert_eq!(Arc::strong_count(&v1), 1);
    }

    #[test]
    fn test_get_removes_expired_entry() {
        let cache = lru_cache(10);
        let v1 = value("one");
        cache.put("key1".to_string(), &v1);
        drop(v1);

        // Still physically present until something notices
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains("key1"));
        assert_eq!(cache.len(), 1, "contains must not remove entries");

        assert!(cache.get("key1").is_none());
        assert_eq!(cache.len(), 0);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = lru_cache(10);
        let keep = value("keep");
        cache.put("keep".to_string(), &keep);
        {
            let temp_a = value("a");
            let temp_b = value("b");
            cache.put("a".to_string(), &temp_a);
            cache.put("b".to_string(), &temp_b);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.cleanup_expired(), 0, "cleanup is idempotent");
        assert!(cache.contains("keep"));
    }

    #[test]
    fn test_put_cleans_up_before_insert() {
        let cache = lru_cache(10);
        {
            let temp = value("temp");
            cache.put("temp".to_string(), &temp);
        }
        let v1 = value("one");
        cache.put("key1".to_string(), &v1);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite() {
        let cache = lru_cache(10);
        let v1 = value("one");
        let v2 = value("two");

        cache.put("key".to_string(), &v1);
        cache.put("key".to_string(), &v2);

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.get("key").unwrap(), &v2));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let cache = lru_cache(2);
        let v1 = value("one");
        let v2 = value("two");
        let v3 = value("three");

        cache.put("key1".to_string(), &v1);
        cache.put("key2".to_string(), &v2);
        cache.put("key1".to_string(), &v3);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("key2"));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_lru_scenario() {
        let cache = lru_cache(2);
        let r1 = value("Resource 1");
        let r2 = value("Resource 2");

        cache.put("key1".to_string(), &r1);
        cache.put("key2".to_string(), &r2);
        assert!(cache.get("key1").is_some());
        cache.put("key3".to_string(), &r2);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("key1"));
        assert!(!cache.contains("key2"));
        assert!(cache.contains("key3"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_scope_exit_scenario() {
        let cache = lru_cache(2);
        let r1 = value("Resource 1");
        cache.put("key1".to_string(), &r1);
        {
            let temp = value("Temp resource");
            cache.put("temp".to_string(), &temp);
        }

        assert!(!cache.contains("temp"));
        assert!(cache.get("temp").is_none());
        assert!(cache.contains("key1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_every_insert_trigger_reproduces_eager_eviction() {
        let cache = lru_cache(2).with_trigger(EvictionTrigger::EveryInsert);
        let r1 = value("Resource 1");
        let r2 = value("Resource 2");

        cache.put("key1".to_string(), &r1);
        cache.put("key2".to_string(), &r2);
        assert!(cache.get("key1").is_none(), "key1 evicted by second put");
        cache.put("key3".to_string(), &r2);

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("key3"));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_no_policy_fallback_evicts_one() {
        let cache: ObjectCache<String, String> = ObjectCache::with_policy(2, None);
        let v = value("v");

        cache.put("a".to_string(), &v);
        cache.put("b".to_string(), &v);
        cache.put("c".to_string(), &v);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("c"));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.policy_name(), None);
    }

    #[test]
    fn test_no_policy_on_empty_cache_is_noop() {
        let cache: ObjectCache<String, String> =
            ObjectCache::with_policy(2, None).with_trigger(EvictionTrigger::EveryInsert);
        let v = value("v");

        cache.put("a".to_string(), &v);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_set_policy_applies_to_next_eviction() {
        let cache = lru_cache(2);
        let v = value("v");

        cache.put("a".to_string(), &v);
        cache.put("b".to_string(), &v);

        cache.set_policy(Box::new(MruPolicy));
        assert_eq!(cache.policy_name(), Some("mru"));
        cache.put("c".to_string(), &v);

        // MRU evicted b, the most recently inserted
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));

        cache.set_policy(Box::new(FifoPolicy));
        cache.put("d".to_string(), &v);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_clear_policy() {
        let cache = lru_cache(2);
        cache.clear_policy();
        assert_eq!(cache.policy_name(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let cache = lru_cache(10);
        let v = value("v");
        cache.put("a".to_string(), &v);
        cache.put("b".to_string(), &v);

        cache.clear();
        assert_eq!(cache.len(), 0);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(!cache.contains("a"));
        assert!(!cache.contains("b"));
        assert_eq!(Arc::strong_count(&v), 1);
    }

    #[test]
    fn test_remove() {
        let cache = lru_cache(10);
        let v = value("v");
        cache.put("a".to_string(), &v);

        let removed = cache.remove("a").unwrap();
        assert!(Arc::ptr_eq(&removed, &v));
        assert!(cache.remove("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_expired_returns_none() {
        let cache = lru_cache(10);
        {
            let v = value("v");
            cache.put("a".to_string(), &v);
        }
        assert!(cache.remove("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            max_size: 3,
            policy: "fifo".to_string(),
            eviction_trigger: EvictionTrigger::EveryInsert,
            sweep_interval: 0,
        };
        let cache: ObjectCache<String, String> = ObjectCache::from_config(&config).unwrap();

        assert_eq!(cache.max_size(), 3);
        assert_eq!(cache.policy_name(), Some(PolicyKind::Fifo.as_str()));
        assert_eq!(cache.trigger(), EvictionTrigger::EveryInsert);
    }

    #[test]
    fn test_from_config_without_policy() {
        let config = Config {
            policy: "none".to_string(),
            ..Config::default()
        };
        let cache: ObjectCache<String, String> = ObjectCache::from_config(&config).unwrap();
        assert_eq!(cache.policy_name(), None);
    }

    #[test]
    fn test_from_config_rejects_bad_values() {
        let zero = Config {
            max_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            ObjectCache::<String, String>::from_config(&zero),
            Err(CacheError::InvalidConfig(_))
        ));

        let unknown = Config {
            policy: "random".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            ObjectCache::<String, String>::from_config(&unknown),
            Err(CacheError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_snapshot_counts_live_entries() {
        let cache = lru_cache(10);
        let keep = value("keep");
        cache.put("keep".to_string(), &keep);
        {
            let temp = value("temp");
            cache.put("temp".to_string(), &temp);
        }

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.size, 2);
        assert_eq!(snapshot.live, 1);
        assert_eq!(snapshot.max_size, 10);
        assert_eq!(snapshot.policy, Some("lru"));
    }

    #[test]
    fn test_cache_is_shareable_across_threads() {
        let cache = Arc::new(lru_cache(64));
        let values: Vec<Arc<String>> = (0..8).map(|i| value(&format!("v{}", i))).collect();

        let handles: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let cache = Arc::clone(&cache);
                let v = Arc::clone(v);
                std::thread::spawn(move || {
                    for round in 0..50 {
                        let key = format!("t{}-{}", i, round % 4);
                        cache.put(key.clone(), &v);
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 32);
    }
}
