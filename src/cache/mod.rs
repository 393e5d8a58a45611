//! Cache Module
//!
//! Provides an object cache of weak references with lazy expiry and pluggable eviction.

mod entry;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use policy::{EvictionPolicy, EvictionTrigger, FifoPolicy, LruPolicy, MruPolicy, PolicyKind};
pub use stats::CacheStats;
pub use store::ObjectCache;

// == Public Constants ==
/// Capacity used when none is configured
pub const DEFAULT_MAX_SIZE: usize = 1000;
