//! Models Module
//!
//! Serializable reports describing cache state.

mod snapshot;

pub use snapshot::CacheSnapshot;
