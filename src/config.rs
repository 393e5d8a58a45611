//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use crate::cache::{EvictionTrigger, PolicyKind, DEFAULT_MAX_SIZE};
use crate::error::{CacheError, Result};

/// Policy name meaning "no policy", which falls back to arbitrary eviction.
pub const NO_POLICY: &str = "none";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live entries the cache holds
    pub max_size: usize,
    /// Eviction policy name: `lru`, `mru`, `fifo` or `none`
    pub policy: String,
    /// When `put` evicts
    pub eviction_trigger: EvictionTrigger,
    /// Background sweep interval in seconds, 0 disables the sweeper
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Values that fail to parse fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `WEAK_CACHE_MAX_SIZE` - Maximum live entries (default: 1000)
    /// - `WEAK_CACHE_POLICY` - Eviction policy name (default: lru)
    /// - `WEAK_CACHE_EVICTION_TRIGGER` - `at_capacity` or `every_insert` (default: at_capacity)
    /// - `WEAK_CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_size: env::var("WEAK_CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            policy: env::var("WEAK_CACHE_POLICY").unwrap_or(defaults.policy),
            eviction_trigger: env::var("WEAK_CACHE_EVICTION_TRIGGER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.eviction_trigger),
            sweep_interval: env::var("WEAK_CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
        }
    }

    /// Checks that the values describe a usable cache.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        self.policy().map(|_| ())
    }

    /// Resolves the configured policy name. `none` yields `Ok(None)`.
    pub fn policy(&self) -> Result<Option<PolicyKind>> {
        if self.policy.trim().eq_ignore_ascii_case(NO_POLICY) {
            return Ok(None);
        }
        self.policy.parse().map(Some)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            policy: PolicyKind::default().to_string(),
            eviction_trigger: EvictionTrigger::default(),
            sweep_interval: 0,
        }
    }
}
