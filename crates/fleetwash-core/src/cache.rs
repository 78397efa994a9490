//! Bounded LRU cache used by the aggregation layer to memoize scan costs.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A capacity-bounded LRU (Least Recently Used) cache.
///
/// Entries carry the tick of their last access, and `recency` orders keys by
/// that tick so the oldest entry is found without scanning. A capacity of 0
/// stores nothing.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, (V, u64)>, // Key -> (Value, last access tick)
    recency: BTreeMap<u64, K>, // Last access tick -> Key
    tick: u64,
    hits: u64,
    misses: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.min(4096)),
            recency: BTreeMap::new(),
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Get a value, refreshing its recency and counting the hit or miss
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.tick += 1;
        match self.map.get_mut(key) {
            Some((value, last_access)) => {
                if let Some(recent) = self.recency.remove(last_access) {
                    self.recency.insert(self.tick, recent);
                }
                *last_access = self.tick;
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a value, evicting the least recently used entry when full
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        self.tick += 1;

        if let Some((_, last_access)) = self.map.get(&key) {
            self.recency.remove(last_access);
        } else if self.map.len() >= self.capacity {
            self.evict_lru();
        }

        self.recency.insert(self.tick, key.clone());
        self.map.insert(key, (value, self.tick));
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.recency.clear();
        self.tick = 0;
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            size: self.map.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn evict_lru(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.map.remove(&key);
        }
    }
}

/// Cache statistics for logging and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub capacity: usize,
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }

    /// Cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 { 0.0 } else { (self.size as f64 / self.capacity as f64) * 100.0 }
    }
}
