//! Weak Cache demo
//!
//! Walks through the cache's life-cycle with resources whose creation and
//! destruction are logged, so expiry and eviction can be watched in order.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weak_cache::{spawn_sweep_task, Config, ObjectCache};

/// Demo payload that logs when it is created and dropped.
struct Resource {
    data: String,
}

impl Resource {
    fn new(data: impl Into<String>) -> Arc<Self> {
        let data = data.into();
        info!("Resource created: {}", data);
        Arc::new(Self { data })
    }

    fn data(&self) -> &str {
        &self.data
    }
}

impl Drop for Resource {
    fn drop(&mut self) {
        info!("Resource destroyed: {}", self.data);
    }
}

/// Builds a two-slot cache using the configured policy and trigger.
fn demo_cache(config: &Config) -> anyhow::Result<ObjectCache<String, Resource>> {
    let config = Config {
        max_size: 2,
        ..config.clone()
    };
    ObjectCache::from_config(&config).context("invalid cache configuration")
}

fn log_snapshot(cache: &ObjectCache<String, Resource>) -> anyhow::Result<()> {
    let snapshot = serde_json::to_string(&cache.snapshot())?;
    info!("Cache snapshot: {}", snapshot);
    Ok(())
}

/// A value whose only owner leaves scope disappears from the cache.
fn objects_deleted_after_scope(config: &Config) -> anyhow::Result<()> {
    info!(">>>>> OBJECTS DELETED AFTER SCOPE");
    let cache = demo_cache(config)?;

    let res1 = Resource::new("Resource 1");
    cache.put("key1".to_string(), &res1);
    {
        let temp = Resource::new("Temp resource");
        cache.put("temp".to_string(), &temp);
    }

    info!("Cache size: {}", cache.len());
    info!("Contains key1: {}", cache.contains("key1"));
    info!("Contains temp: {}", cache.contains("temp"));
    info!("Value @temp exists: {}", cache.get("temp").is_some());
    log_snapshot(&cache)
}

/// The least recently read key is the one evicted.
fn lru(config: &Config) -> anyhow::Result<()> {
    info!(">>>>> LRU");
    let cache = demo_cache(config)?;

    let res1 = Resource::new("Resource 1");
    let res2 = Resource::new("Resource 2");
    let _res3 = Resource::new("Resource 3");

    cache.put("key1".to_string(), &res1);
    cache.put("key2".to_string(), &res2);
    if let Some(value) = cache.get("key1") {
        info!("Read key1: {}", value.data());
    }
    cache.put("key3".to_string(), &res2);

    info!("Cache size: {}", cache.len());
    info!("Contains key1: {}", cache.contains("key1"));
    info!("Contains key2: {}", cache.contains("key2"));
    info!("Contains key3: {}", cache.contains("key3"));
    log_snapshot(&cache)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weak_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: max_size={}, policy={}, eviction_trigger={}, sweep_interval={}s",
        config.max_size, config.policy, config.eviction_trigger, config.sweep_interval
    );

    objects_deleted_after_scope(&config)?;
    lru(&config)?;

    if config.sweep_interval > 0 {
        let cache = Arc::new(ObjectCache::<String, Resource>::from_config(&config)?);
        let sweep_handle = spawn_sweep_task(cache.clone(), config.sweep_interval);
        {
            let temp = Resource::new("Swept resource");
            cache.put("swept".to_string(), &temp);
        }
        info!("Waiting for expiry sweep, cache size: {}", cache.len());
        tokio::time::sleep(std::time::Duration::from_secs(config.sweep_interval + 1)).await;
        info!("After sweep, cache size: {}", cache.len());
        sweep_handle.abort();
    }

    info!("Demo complete");
    Ok(())
}
