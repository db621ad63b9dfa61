//! Integration Tests for the Cache Service
//!
//! Exercises the full public contract end to end: store/read/remove/clear,
//! capacity-driven eviction under LRU and FIFO, TTL expiration in both
//! stampede modes, and the blocking refresh protocol under concurrency.

use std::sync::Once;
use std::time::Duration;

use serde::Serialize;
use stalecache::{CacheConfig, CacheError, CacheService, EvictionMode, Lookup, Ttl};

// == Helper Functions ==

static TRACING: Once = Once::new();

/// Routes cache logs through the test harness; RUST_LOG selects verbosity.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn config(algorithm: EvictionMode, capacity: i64, blocking: bool) -> CacheConfig {
    init_tracing();
    CacheConfig {
        algorithm,
        capacity,
        blocking,
        default_ttl: 300,
        sweep_interval: 0,
    }
}

fn default_service() -> CacheService<String> {
    CacheService::new(&config(EvictionMode::Lru, 100, false)).unwrap()
}

// == Basic Contract Tests ==

#[tokio::test]
async fn test_store_then_read_returns_value() {
    let service = default_service();

    service.store("alpha", "one".to_string()).await.unwrap();

    assert_eq!(service.read("alpha").await.unwrap(), Some("one".to_string()));
}

#[tokio::test]
async fn test_read_absent_key_is_a_miss_not_an_error() {
    let service = default_service();

    assert_eq!(service.read("never_stored").await.unwrap(), None);
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let service = default_service();

    service.store("alpha", "one".to_string()).await.unwrap();
    service.store("alpha", "two".to_string()).await.unwrap();

    assert_eq!(service.read("alpha").await.unwrap(), Some("two".to_string()));
    assert_eq!(service.len().await, 1);
}

#[tokio::test]
async fn test_remove_returns_previous_and_leaves_absent() {
    let service = default_service();

    service.store("alpha", "one".to_string()).await.unwrap();

    assert_eq!(
        service.remove("alpha").await.unwrap(),
        Some("one".to_string())
    );
    assert_eq!(service.read("alpha").await.unwrap(), None);
    assert_eq!(service.remove("alpha").await.unwrap(), None);
}

#[tokio::test]
async fn test_clear_makes_every_key_absent() {
    let service = default_service();

    for i in 0..10 {
        service
            .store(&format!("key{}", i), i.to_string())
            .await
            .unwrap();
    }

    service.clear().await;

    assert!(service.is_empty().await);
    for i in 0..10 {
        assert_eq!(service.read(&format!("key{}", i)).await.unwrap(), None);
    }
}

// == Key Encoding Tests ==

#[derive(Serialize)]
struct SessionKey {
    tenant: String,
    user_id: u64,
}

#[tokio::test]
async fn test_value_equal_composite_keys_share_a_slot() {
    let service = default_service();

    let stored_with = SessionKey {
        tenant: "acme".to_string(),
        user_id: 7,
    };
    let read_with = SessionKey {
        tenant: "acme".to_string(),
        user_id: 7,
    };

    service
        .store(&stored_with, "session_data".to_string())
        .await
        .unwrap();

    assert_eq!(
        service.read(&read_with).await.unwrap(),
        Some("session_data".to_string())
    );
}

#[tokio::test]
async fn test_null_key_is_rejected() {
    let service = default_service();

    let result = service.store(&Option::<String>::None, "x".to_string()).await;
    assert!(matches!(result, Err(CacheError::InvalidKey(_))));

    let result = service.read(&Option::<String>::None).await;
    assert!(matches!(result, Err(CacheError::InvalidKey(_))));
}

// == Capacity and Eviction Tests ==

#[tokio::test]
async fn test_capacity_never_exceeded() {
    let service = CacheService::new(&config(EvictionMode::Lru, 5, false)).unwrap();

    for i in 0..50 {
        service
            .store(&format!("key{}", i), i.to_string())
            .await
            .unwrap();
        assert!(service.len().await <= 5);
    }
}

#[tokio::test]
async fn test_lru_eviction_prefers_least_recently_read() {
    let service = CacheService::new(&config(EvictionMode::Lru, 2, false)).unwrap();

    service.store("a", "1".to_string()).await.unwrap();
    service.store("b", "2".to_string()).await.unwrap();

    // Refresh recency of "a", then overflow with "c": "b" must be evicted
    service.read("a").await.unwrap();
    service.store("c", "3".to_string()).await.unwrap();

    assert_eq!(service.read("a").await.unwrap(), Some("1".to_string()));
    assert_eq!(service.read("b").await.unwrap(), None);
    assert_eq!(service.read("c").await.unwrap(), Some("3".to_string()));
}

#[tokio::test]
async fn test_fifo_eviction_ignores_reads() {
    let service = CacheService::new(&config(EvictionMode::Fifo, 2, false)).unwrap();

    service.store("a", "1".to_string()).await.unwrap();
    service.store("b", "2".to_string()).await.unwrap();

    // Even a fresh read of "a" cannot save it under FIFO
    service.read("a").await.unwrap();
    service.store("c", "3".to_string()).await.unwrap();

    assert_eq!(service.read("a").await.unwrap(), None);
    assert_eq!(service.read("b").await.unwrap(), Some("2".to_string()));
}

#[tokio::test]
async fn test_unlimited_mode_never_evicts() {
    let service = CacheService::new(&config(EvictionMode::Unlimited, -1, false)).unwrap();

    for i in 0..500 {
        service
            .store(&format!("key{}", i), i.to_string())
            .await
            .unwrap();
    }

    assert_eq!(service.len().await, 500);
    assert_eq!(service.stats().await.evictions, 0);
}

// == Expiration Tests ==

#[tokio::test]
async fn test_expired_entry_blocking_mode_reads_absent() {
    let service = CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap();

    service
        .store_with_ttl("k", "v".to_string(), Ttl::After(Duration::from_secs(1)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    // The reader claims the refresh and observes absent
    assert_eq!(service.read("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_expired_entry_non_blocking_mode_serves_stale() {
    let service = CacheService::new(&config(EvictionMode::Lru, 100, false)).unwrap();

    service
        .store_with_ttl("k", "v".to_string(), Ttl::After(Duration::from_secs(1)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(service.read("k").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn test_explicit_zero_ttl_is_stale_immediately() {
    let blocking = CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap();
    blocking
        .store_with_ttl("k", "v".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(blocking.read("k").await.unwrap(), None);

    let non_blocking = CacheService::new(&config(EvictionMode::Lru, 100, false)).unwrap();
    non_blocking
        .store_with_ttl("k", "v".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(
        non_blocking.read("k").await.unwrap(),
        Some("v".to_string())
    );
}

#[tokio::test]
async fn test_never_ttl_outlives_short_default() {
    let mut cfg = config(EvictionMode::Lru, 100, false);
    cfg.default_ttl = 1;
    let service = CacheService::new(&cfg).unwrap();

    service
        .store_with_ttl("eternal", "v".to_string(), Ttl::Never)
        .await
        .unwrap();
    service.store("fleeting", "w".to_string()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(
        service.read("eternal").await.unwrap(),
        Some("v".to_string())
    );
    // Non-blocking mode still serves the stale defaulted entry
    match service.lookup("fleeting").await.unwrap() {
        Lookup::Stale { value, .. } => assert_eq!(value, "w"),
        other => panic!("expected stale entry, got {:?}", other),
    }
}

// == Stampede Control Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stampede_exactly_one_refresher() {
    let service = std::sync::Arc::new(
        CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap(),
    );

    service
        .store_with_ttl("hot", "old".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();

    const READERS: usize = 8;
    let mut handles = Vec::with_capacity(READERS);
    for _ in 0..READERS {
        let service = std::sync::Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            match service.read("hot").await.unwrap() {
                // This reader won the claim: refresh the entry
                None => {
                    service.store("hot", "new".to_string()).await.unwrap();
                    true
                }
                Some(value) => {
                    assert_eq!(value, "new", "waiters must observe the refreshed value");
                    false
                }
            }
        }));
    }

    let mut refreshers = 0;
    for handle in handles {
        if handle.await.unwrap() {
            refreshers += 1;
        }
    }

    assert_eq!(refreshers, 1, "exactly one reader becomes the refresher");
    assert_eq!(
        service.read("hot").await.unwrap(),
        Some("new".to_string())
    );
}

#[tokio::test]
async fn test_released_claim_passes_to_a_waiter() {
    let service = CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap();

    service
        .store_with_ttl("k", "stale".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();

    // First reader claims
    assert_eq!(service.read("k").await.unwrap(), None);

    let service = std::sync::Arc::new(service);
    let waiter = {
        let service = std::sync::Arc::clone(&service);
        tokio::spawn(async move { service.read("k").await.unwrap() })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    service.release("k").await.unwrap();

    // The parked reader is promoted and observes absent
    assert_eq!(waiter.await.unwrap(), None);
}

#[tokio::test]
async fn test_blocked_read_times_out_without_breaking_the_claim() {
    let service = CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap();

    service
        .store_with_ttl("k", "stale".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(service.read("k").await.unwrap(), None);

    let result = service
        .read_with_timeout("k", Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(CacheError::WaitTimeout(_))));

    // The original refresher can still resolve the claim
    service.store("k", "fresh".to_string()).await.unwrap();
    assert_eq!(
        service.read("k").await.unwrap(),
        Some("fresh".to_string())
    );
}

#[tokio::test]
async fn test_clear_releases_blocked_readers() {
    let service = std::sync::Arc::new(
        CacheService::new(&config(EvictionMode::Lru, 100, true)).unwrap(),
    );

    service
        .store_with_ttl("k", "stale".to_string(), Ttl::After(Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(service.read("k").await.unwrap(), None);

    let waiter = {
        let service = std::sync::Arc::clone(&service);
        tokio::spawn(async move { service.read("k").await.unwrap() })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    service.clear().await;

    assert_eq!(waiter.await.unwrap(), None);
}

// == Configuration Tests ==

#[tokio::test]
async fn test_unsupported_algorithm_selector() {
    let result = "mru".parse::<EvictionMode>();
    assert!(matches!(result, Err(CacheError::UnsupportedAlgorithm(_))));
}

#[tokio::test]
async fn test_invalid_capacity_rejected_at_construction() {
    let cfg = config(EvictionMode::Lru, -2, false);
    assert!(matches!(
        CacheService::<String>::new(&cfg),
        Err(CacheError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_stats_reflect_traffic() {
    let service = default_service();

    service.store("a", "1".to_string()).await.unwrap();
    service.read("a").await.unwrap();
    service.read("a").await.unwrap();
    service.read("missing").await.unwrap();

    let stats = service.stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_entries, 1);
    assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
}
