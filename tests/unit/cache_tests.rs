/*!
 * Tests for the TTL cache used by transcript acquisition
 */

use std::time::Duration;

use tldw::transcript::TtlCache;

#[test]
fn test_cache_withFreshEntry_shouldReturnValue() {
    let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));

    cache.set("key1".to_string(), "value1".to_string());
    assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_withMissingKey_shouldReturnNone() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    assert_eq!(cache.get(&"absent".to_string()), None);
}

#[test]
fn test_cache_withExpiredEntry_shouldEvictOnRead() {
    let cache: TtlCache<String, String> = TtlCache::new(Duration::from_millis(30));

    cache.set("key1".to_string(), "value1".to_string());
    std::thread::sleep(Duration::from_millis(60));

    assert_eq!(cache.get(&"key1".to_string()), None);
    // The expired entry was removed, not just hidden
    assert!(cache.is_empty());
}

#[test]
fn test_cache_overwrite_shouldReseatTtl() {
    let cache: TtlCache<String, String> = TtlCache::new(Duration::from_millis(80));

    cache.set("key1".to_string(), "old".to_string());
    std::thread::sleep(Duration::from_millis(50));

    // Rewriting the key restarts its lifetime
    cache.set("key1".to_string(), "new".to_string());
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(cache.get(&"key1".to_string()), Some("new".to_string()));
}

#[test]
fn test_cacheStats_shouldTrackHitsAndMisses() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    cache.set("hit".to_string(), 1);

    cache.get(&"hit".to_string());
    cache.get(&"hit".to_string());
    cache.get(&"miss".to_string());

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((hit_rate - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_cacheStats_withNoAccesses_shouldReportZeroRate() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    assert_eq!(cache.stats(), (0, 0, 0.0));
}

#[test]
fn test_cacheClear_shouldDropEntriesAndCounters() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    cache.set("a".to_string(), 1);
    cache.get(&"a".to_string());
    cache.get(&"b".to_string());

    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.stats(), (0, 0, 0.0));
}

#[test]
fn test_cacheClone_shouldShareStorage() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    let clone = cache.clone();

    cache.set("shared".to_string(), 7);
    assert_eq!(clone.get(&"shared".to_string()), Some(7));
    assert_eq!(clone.ttl(), Duration::from_secs(60));
}

#[test]
fn test_cache_underConcurrentAccess_shouldStayConsistent() {
    let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    cache.set(worker, i);
                    cache.get(&worker);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 8);
    let (hits, _, _) = cache.stats();
    assert_eq!(hits, 800);
}

#[test]
fn test_cacheStats_underConcurrentLookups_shouldCountEveryOne() {
    let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
    cache.set("present".to_string(), 1);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    if (worker + i) % 2 == 0 {
                        cache.get(&"present".to_string());
                    } else {
                        cache.get(&"absent".to_string());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Counters and entries share a lock; no lookup is lost or split
    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 400);
    assert_eq!(misses, 400);
    assert!((hit_rate - 0.5).abs() < f64::EPSILON);
}
