/*!
 * Time-bounded caching for expensive fetches.
 *
 * This module provides a generic TTL cache used to avoid redundant
 * transcript downloads. Expiry is lazy: entries are checked on read and
 * evicted when stale, there is no background sweeper.
 */

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;

/// Value plus the instant it was published
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Entry map and counters behind one lock, so `stats` always sees a
/// consistent snapshot
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    hits: usize,
    misses: usize,
}

/// Keyed store whose entries expire `ttl` after insertion.
///
/// Callers compute values outside the cache and publish them with
/// [`set`](TtlCache::set); no lock is held while a value is being
/// produced, so two concurrent misses may both compute and the last
/// write wins. Overwriting an entry reseats its TTL.
pub struct TtlCache<K, V> {
    /// Internal cache storage with hit/miss counters
    state: Arc<RwLock<CacheState<K, V>>>,

    /// Entry lifetime
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    /// Create a new cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            })),
            ttl,
        }
    }

    /// Look up a value. A fresh entry counts as a hit and is cloned out;
    /// an expired entry is evicted and counts as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut guard = self.state.write();
        let state = &mut *guard;

        // Clone the value out first; eviction and the counters need the
        // entry borrow released
        let lookup = state.entries.get(key).map(|entry| {
            (now.duration_since(entry.inserted_at) <= self.ttl).then(|| entry.value.clone())
        });

        match lookup {
            Some(Some(value)) => {
                state.hits += 1;
                debug!("Cache hit for {:?}", key);
                Some(value)
            }
            Some(None) => {
                state.entries.remove(key);
                state.misses += 1;
                debug!("Evicted expired cache entry for {:?}", key);
                None
            }
            None => {
                state.misses += 1;
                debug!("Cache miss for {:?}", key);
                None
            }
        }
    }

    /// Publish a value under `key`, stamping it with the current instant
    pub fn set(&self, key: K, value: V) {
        self.state.write().entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Get cache statistics as (hits, misses, hit_rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let state = self.state.read();
        let total = state.hits + state.misses;

        let hit_rate = if total > 0 {
            state.hits as f64 / total as f64
        } else {
            0.0
        };

        (state.hits, state.misses, hit_rate)
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;

        debug!("Cache cleared");
    }

    /// Number of stored entries, expired ones included until they are read
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Configured entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            ttl: self.ttl,
        }
    }
}
