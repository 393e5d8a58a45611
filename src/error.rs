//! Error types for the cache
//!
//! Core cache operations never fail; absence and expiry surface as `None`.
//! These errors only come from building a cache out of configuration.

use thiserror::Error;

// == Cache Error Enum ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A configuration value is out of range or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No built-in eviction policy has this name
    #[error("Unknown eviction policy: {0}")]
    UnknownPolicy(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
