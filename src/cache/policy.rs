//! Eviction Policy Module
//!
//! Pluggable strategies choosing which entry leaves the cache when room is needed.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::Serialize;

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Eviction Policy ==
/// Strategy invoked by the cache, under its lock, to free a slot.
///
/// An implementation removes at most one entry from `entries` and returns the
/// key it removed. Policies are told nothing about capacity; deciding *when*
/// to evict belongs to the cache.
pub trait EvictionPolicy<K, V>: Send {
    /// Removes zero or one entry, returning the evicted key.
    fn evict(&mut self, entries: &mut HashMap<K, CacheEntry<V>>) -> Option<K>;

    /// Short name used in logs and snapshots.
    fn name(&self) -> &'static str;
}

/// Removes the entry whose `key_fn` is smallest. Ties go to the first entry seen.
fn remove_min_by<K, V, O, F>(entries: &mut HashMap<K, CacheEntry<V>>, key_fn: F) -> Option<K>
where
    K: Eq + Hash + Clone,
    O: Ord,
    F: Fn(&CacheEntry<V>) -> O,
{
    let victim = entries
        .iter()
        .min_by_key(|&(_, entry)| key_fn(entry))
        .map(|(key, _)| key.clone())?;
    entries.remove(&victim);
    Some(victim)
}

// == LRU Policy ==
/// Least Recently Used: evicts the entry with the oldest last access.
///
/// Scans every entry, so each eviction is O(n).
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl<K, V> EvictionPolicy<K, V> for LruPolicy
where
    K: Eq + Hash + Clone,
{
    fn evict(&mut self, entries: &mut HashMap<K, CacheEntry<V>>) -> Option<K> {
        remove_min_by(entries, |entry| entry.recency())
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

// == MRU Policy ==
/// Most Recently Used: evicts the entry accessed last.
#[derive(Debug, Clone, Copy, Default)]
pub struct MruPolicy;

impl<K, V> EvictionPolicy<K, V> for MruPolicy
where
    K: Eq + Hash + Clone,
{
    fn evict(&mut self, entries: &mut HashMap<K, CacheEntry<V>>) -> Option<K> {
        remove_min_by(entries, |entry| std::cmp::Reverse(entry.recency()))
    }

    fn name(&self) -> &'static str {
        "mru"
    }
}

// == FIFO Policy ==
/// First In First Out: evicts the oldest inserted entry, ignoring reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoPolicy;

impl<K, V> EvictionPolicy<K, V> for FifoPolicy
where
    K: Eq + Hash + Clone,
{
    fn evict(&mut self, entries: &mut HashMap<K, CacheEntry<V>>) -> Option<K> {
        remove_min_by(entries, |entry| entry.age())
    }

    fn name(&self) -> &'static str {
        "fifo"
    }
}

// == Policy Kind ==
/// The built-in policies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Lru,
    Mru,
    Fifo,
}

impl PolicyKind {
    /// Builds a boxed instance of this policy.
    pub fn build<K, V>(self) -> Box<dyn EvictionPolicy<K, V>>
    where
        K: Eq + Hash + Clone,
    {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy),
            PolicyKind::Mru => Box::new(MruPolicy),
            PolicyKind::Fifo => Box::new(FifoPolicy),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Mru => "mru",
            PolicyKind::Fifo => "fifo",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "mru" => Ok(PolicyKind::Mru),
            "fifo" => Ok(PolicyKind::Fifo),
            other => Err(CacheError::UnknownPolicy(other.to_string())),
        }
    }
}

// == Eviction Trigger ==
/// Decides when `put` asks the policy for a victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionTrigger {
    /// Evict only when inserting a new key while the live entry count is at
    /// or above `max_size`.
    #[default]
    AtCapacity,
    /// Evict one entry before every insert, whatever the current size.
    EveryInsert,
}

impl fmt::Display for EvictionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionTrigger::AtCapacity => f.write_str("at_capacity"),
            EvictionTrigger::EveryInsert => f.write_str("every_insert"),
        }
    }
}

impl FromStr for EvictionTrigger {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "at_capacity" => Ok(EvictionTrigger::AtCapacity),
            "every_insert" => Ok(EvictionTrigger::EveryInsert),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction trigger '{}'",
                other
            ))),
        }
    }
}
