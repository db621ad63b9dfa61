//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries, so
//! memory is reclaimed even for keys nobody reads again. Entries claimed
//! for refresh are left alone; their refresher resolves them.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It briefly takes the cache's write lock per sweep.
///
/// # Arguments
/// * `cache` - Shared cache handle (clones share storage)
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_sweeper_task<V>(cache: Cache<V>, sweep_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL sweeper task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;
    use crate::config::CacheConfig;

    fn cache() -> Cache<String> {
        Cache::new(&CacheConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let cache = cache();

        cache
            .store_with_ttl("expire_soon", "value".to_string(), Ttl::After(Duration::from_secs(1)))
            .await
            .unwrap();

        let handle = spawn_sweeper_task(cache.clone(), 1);

        // Wait for the entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.len().await, 0, "Expired entry should have been swept");

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_preserves_valid_entries() {
        let cache = cache();

        cache
            .store_with_ttl("long_lived", "value".to_string(), Ttl::After(Duration::from_secs(3600)))
            .await
            .unwrap();

        let handle = spawn_sweeper_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            cache.read("long_lived").await.unwrap(),
            Some("value".to_string()),
            "Valid entry should not be removed"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_spares_claimed_entries() {
        let config = CacheConfig {
            blocking: true,
            ..CacheConfig::default()
        };
        let cache: Cache<String> = Cache::new(&config).unwrap();

        cache
            .store_with_ttl("claimed", "stale".to_string(), Ttl::After(Duration::ZERO))
            .await
            .unwrap();
        // Claim the refresh
        assert_eq!(cache.read("claimed").await.unwrap(), None);

        let handle = spawn_sweeper_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len().await, 1, "Claimed entry must survive sweeps");

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let handle = spawn_sweeper_task(cache(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
