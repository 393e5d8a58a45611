//! Expiry Sweep Task
//!
//! Background task that periodically discards entries whose values were dropped.
//! Every cache operation already cleans up lazily; the sweep only keeps idle
//! caches from holding on to stale entries.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ObjectCache;

/// Spawns a task that calls [`ObjectCache::cleanup_expired`] every
/// `interval_secs` seconds.
///
/// An interval of zero is treated as one second. The returned handle should
/// be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ObjectCache::<String, Resource>::new(1000));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<K, V>(cache: Arc<ObjectCache<K, V>>, interval_secs: u64) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    let interval_secs = interval_secs.max(1);
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} stale entries", removed);
            } else {
                debug!("Expiry sweep: no stale entries found");
            }
        }
    })
}
