//! Weak Cache - an in-process object cache of non-owning references
//!
//! Values stay owned by their callers; the cache only remembers where they
//! are, forgets them once they are dropped, and evicts through a pluggable
//! policy (LRU by default).

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{EvictionPolicy, EvictionTrigger, ObjectCache, PolicyKind};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
