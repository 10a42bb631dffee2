//! Time-bounded cache with refresh on read

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    refreshed_at: Instant,
}

/// A map whose entries go stale `ttl` after they were last refreshed
///
/// Loading happens outside the lock, so a slow loader never blocks readers of
/// other keys. Two threads missing the same key may both load it; the later
/// write wins.
pub struct TtlCache<K, V> {
    ttl: Duration,
    capacity: Option<usize>,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            capacity: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Bound the number of entries; the least recently refreshed is evicted
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: Some(capacity),
            entries: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value if it is still fresh
    pub fn get_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.refreshed_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// The cached value, reloading it first when missing or stale
    pub fn get_or_refresh<F>(&self, key: &K, load: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.get_fresh(key) {
            return value;
        }

        let value = load(key);
        self.insert(key.clone(), value.clone());
        value
    }

    /// Keys from `keys` that are missing or stale
    pub fn stale_keys<'k>(&self, keys: impl IntoIterator<Item = &'k K>) -> Vec<K>
    where
        K: 'k,
    {
        let entries = self.entries.lock();
        keys.into_iter()
            .filter(|key| {
                entries
                    .get(*key)
                    .map_or(true, |entry| entry.refreshed_at.elapsed() >= self.ttl)
            })
            .cloned()
            .collect()
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();

        if let Some(capacity) = self.capacity {
            if !entries.contains_key(&key) && entries.len() >= capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.refreshed_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                refreshed_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
