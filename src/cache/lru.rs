//! Bounded least-recently-used response cache.
//!
//! # Responsibilities
//! - Map full request URLs to raw response bytes
//! - Promote entries to most-recently-used on every get and put
//! - Evict exactly one tail entry when an insertion would exceed capacity
//!
//! # Design Decisions
//! - One mutex serializes every operation: the recency deque and the content
//!   map must mutate together, so finer-grained locking cannot apply
//! - Pure LRU; there is no frequency dimension and no TTL
//! - Contents are `Arc<[u8]>` so a hit hands out a cheap clone, not a copy

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::observability::metrics;

/// Shared, bounded LRU cache of raw origin responses keyed by full URL.
pub struct ResponseCache {
    inner: Mutex<LruInner>,
}

struct LruInner {
    capacity: usize,
    /// Keys ordered most-recently-used first. Invariant: this always holds
    /// exactly the key set of `pages`.
    order: VecDeque<String>,
    pages: HashMap<String, Arc<[u8]>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// Capacity must be non-zero; config validation enforces this before a
    /// cache is ever constructed.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be non-zero");
        Self {
            inner: Mutex::new(LruInner {
                capacity,
                order: VecDeque::with_capacity(capacity),
                pages: HashMap::with_capacity(capacity),
            }),
        }
    }

    /// Look up a URL, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        let mut inner = self.inner.lock().expect("response cache mutex poisoned");

        let content = inner.pages.get(key).cloned();
        match content {
            Some(content) => {
                inner.promote(key);
                metrics::record_cache_hit();
                Some(content)
            }
            None => {
                metrics::record_cache_miss();
                None
            }
        }
    }

    /// Insert or overwrite an entry, promoting it to most-recently-used.
    ///
    /// When the key is new and the cache is full, the least-recently-used
    /// entry is evicted first; exactly one eviction per such insertion.
    pub fn put(&self, key: String, content: Arc<[u8]>) {
        let mut inner = self.inner.lock().expect("response cache mutex poisoned");

        if inner.pages.contains_key(&key) {
            inner.promote(&key);
        } else {
            if inner.pages.len() == inner.capacity {
                if let Some(evicted) = inner.order.pop_back() {
                    tracing::debug!(key = %evicted, "Evicting least-recently-used entry");
                    inner.pages.remove(&evicted);
                }
            }
            inner.order.push_front(key.clone());
        }
        inner.pages.insert(key, content);
        metrics::record_cache_entries(inner.pages.len());
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("response cache mutex poisoned")
            .pages
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity bound.
    pub fn capacity(&self) -> usize {
        self.inner
            .lock()
            .expect("response cache mutex poisoned")
            .capacity
    }
}

impl LruInner {
    /// Move an existing key to the front of the recency order.
    fn promote(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos).expect("position is in bounds");
            self.order.push_front(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(s: &str) -> Arc<[u8]> {
        Arc::from(s.as_bytes())
    }

    fn fill(cache: &ResponseCache, keys: &[&str]) {
        for key in keys {
            cache.put(key.to_string(), content(key));
        }
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let cache = ResponseCache::new(5);
        for i in 0..50 {
            cache.put(format!("http://example.com/{i}"), content("x"));
            assert!(cache.len() <= 5);
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn lru_entry_is_evicted() {
        let cache = ResponseCache::new(5);
        fill(&cache, &["a", "b", "c", "d", "e"]);

        cache.put("f".to_string(), content("f"));

        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("f").unwrap().as_ref(), b"f");
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn get_promotes_and_protects_from_eviction() {
        let cache = ResponseCache::new(5);
        fill(&cache, &["a", "b", "c", "d", "e"]);

        // Touch "a" so "b" becomes the tail.
        assert!(cache.get("a").is_some());
        cache.put("f".to_string(), content("f"));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn put_promotes_existing_key() {
        let cache = ResponseCache::new(5);
        fill(&cache, &["a", "b", "c", "d", "e"]);

        // Re-put "a"; "b" is now the eviction victim.
        cache.put("a".to_string(), content("a2"));
        cache.put("f".to_string(), content("f"));

        assert_eq!(cache.get("a").unwrap().as_ref(), b"a2");
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn reinsertion_is_idempotent() {
        let cache = ResponseCache::new(5);
        cache.put("k".to_string(), content("v"));
        cache.put("k".to_string(), content("v"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().as_ref(), b"v");

        // The duplicate put must not have evicted anything ahead of time.
        fill(&cache, &["a", "b", "c", "d"]);
        assert_eq!(cache.len(), 5);
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn overwrite_replaces_content() {
        let cache = ResponseCache::new(2);
        cache.put("k".to_string(), content("old"));
        cache.put("k".to_string(), content("new"));

        assert_eq!(cache.get("k").unwrap().as_ref(), b"new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResponseCache::new(2);
        assert!(cache.get("http://example.com/").is_none());
    }

    #[test]
    fn concurrent_access_keeps_invariants() {
        let cache = Arc::new(ResponseCache::new(8));
        let mut handles = Vec::new();

        for t in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("http://example.com/{}", (t * 7 + i) % 32);
                    cache.put(key.clone(), content("x"));
                    cache.get(&key);
                    assert!(cache.len() <= 8);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 8);
    }
}
