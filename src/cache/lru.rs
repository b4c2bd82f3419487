//! Bounded map with least-recently-used eviction.
//!
//! Both cache tiers (per-region feature cache and whole-frame result cache)
//! sit on this structure. Recency is tracked with a monotonic access counter
//! instead of wall-clock time so behaviour stays deterministic under test.

use std::collections::HashMap;
use std::hash::Hash;

struct Slot<V> {
    value: V,
    last_used: u64,
}

pub struct LruMap<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, Slot<V>>,
}

impl<K: Eq + Hash + Clone, V> LruMap<K, V> {
    /// A zero capacity map never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tick: 0,
            entries: HashMap::with_capacity(capacity.min(1024)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key, refreshing its recency on hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|slot| {
            slot.last_used = tick;
            &slot.value
        })
    }

    /// Insert a value, evicting the least-recently-used entry when full.
    /// Returns true when an eviction happened.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }
        self.tick += 1;
        let mut evicted = false;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
                evicted = true;
            }
        }
        self.entries.insert(
            key,
            Slot {
                value,
                last_used: self.tick,
            },
        );
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut map = LruMap::new(2);
        map.insert("a", 1);
        map.insert("b", 2);
        // Touch "a" so "b" becomes the eviction victim.
        assert_eq!(map.get(&"a"), Some(&1));
        let evicted = map.insert("c", 3);
        assert!(evicted);
        assert_eq!(map.get(&"b"), None);
        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(map.get(&"c"), Some(&3));
    }

    #[test]
    fn reinsert_updates_without_eviction() {
        let mut map = LruMap::new(2);
        map.insert("a", 1);
        map.insert("b", 2);
        let evicted = map.insert("a", 10);
        assert!(!evicted);
        assert_eq!(map.get(&"a"), Some(&10));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut map = LruMap::new(0);
        map.insert("a", 1);
        assert!(map.is_empty());
        assert_eq!(map.get(&"a"), None);
    }
}
