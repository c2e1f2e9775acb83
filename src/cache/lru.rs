//! Bounded least-recently-used cache.
//!
//! [`LruCache`] is the primitive behind every tier in [`Caches`](super::Caches).
//! Entries live in a slab (`Vec`) threaded into a doubly-linked recency list
//! by index, with a `HashMap` from key to slot. The list runs from the most
//! recently used entry (`head`) to the least recently used one (`tail`).
//!
//! Eviction is purely capacity-driven: there is no TTL and no delete. When a
//! new key arrives at full capacity, the tail slot is reused for it, so the
//! slab never grows past `capacity` and `index.len() == slots.len()` holds
//! after every operation.
//!
//! `get` reorders the list, so both `get` and `set` take the same exclusive
//! lock. One lock per cache instance; tiers never nest locks.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Sentinel link for "no neighbour".
const NIL: usize = usize::MAX;

struct Slot<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

struct Inner<K, V> {
    capacity: usize,
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    head: usize,
    tail: usize,
}

impl<K: Hash + Eq + Clone, V> Inner<K, V> {
    fn new(capacity: usize) -> Self {
        // Unbounded caches start small and grow on demand.
        let prealloc = capacity.min(1024);
        Self {
            capacity,
            index: HashMap::with_capacity(prealloc),
            slots: Vec::with_capacity(prealloc),
            head: NIL,
            tail: NIL,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head != idx {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn is_full(&self) -> bool {
        self.capacity != 0 && self.slots.len() >= self.capacity
    }

    /// Insert or refresh; returns the evicted key, if any.
    fn set(&mut self, key: K, value: V) -> Option<K> {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.touch(idx);
            return None;
        }

        if self.is_full() {
            let idx = self.tail;
            self.unlink(idx);
            let slot = &mut self.slots[idx];
            let evicted = std::mem::replace(&mut slot.key, key.clone());
            slot.value = value;
            self.index.remove(&evicted);
            self.index.insert(key, idx);
            self.push_front(idx);
            return Some(evicted);
        }

        let idx = self.slots.len();
        self.slots.push(Slot {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.index.insert(key, idx);
        self.push_front(idx);
        None
    }
}

/// Thread-safe, fixed-capacity LRU cache.
///
/// Capacity `0` means unbounded. Values are returned by clone, so tiers
/// holding large values store them behind an `Arc`.
///
/// ```rust
/// # use playbadge::cache::LruCache;
/// let cache = LruCache::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get(&"a");
/// cache.set("c", 3); // evicts "b", the least recently touched
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(1));
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Create an empty cache holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::new(capacity)),
        }
    }

    /// Create an unbounded cache. It never evicts.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    // Poison is ignored; relinking never calls back into user code.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, promoting it to most recently used on a hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock();
        let idx = *inner.index.get(key)?;
        inner.touch(idx);
        Some(inner.slots[idx].value.clone())
    }

    /// Insert or replace the value for `key` and mark it most recently used.
    ///
    /// Returns the key evicted to make room, if the cache was full.
    pub fn set(&self, key: K, value: V) -> Option<K> {
        self.lock().set(key, value)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Keys from most to least recently used. Does not affect recency.
    pub fn keys(&self) -> Vec<K> {
        let inner = self.lock();
        let mut keys = Vec::with_capacity(inner.slots.len());
        let mut cursor = inner.head;
        while cursor != NIL {
            keys.push(inner.slots[cursor].key.clone());
            cursor = inner.slots[cursor].next;
        }
        keys
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LruCache")
            .field("capacity", &inner.capacity)
            .field("len", &inner.slots.len())
            .finish()
    }
}
