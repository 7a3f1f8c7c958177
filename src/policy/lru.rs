//! # Least Recently Used (LRU) Cache
//!
//! The recency store every other policy in this crate builds on: LRU-K uses
//! two of them (main + access history), ARC's recency partition wraps one,
//! and the sharded cache runs one per shard.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                 Arc<RwLock<LruCore<K, V>>>                   │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                 │                                    │
//!   │                                 ▼                                    │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                        LruCore<K, V>                         │   │
//!   │   │                                                              │   │
//!   │   │   index: FxHashMap<K, SlotId>                                │   │
//!   │   │   ┌─────────┬────────┐                                       │   │
//!   │   │   │  key_1  │  id_4  │──────────┐                            │   │
//!   │   │   │  key_2  │  id_0  │────────┐ │                            │   │
//!   │   │   │  key_3  │  id_2  │──────┐ │ │                            │   │
//!   │   │   └─────────┴────────┘      │ │ │                            │   │
//!   │   │                             ▼ ▼ ▼                            │   │
//!   │   │   list: IntrusiveList<Record<K, V>>                          │   │
//!   │   │   head ─► [key_3] ◄──► [key_2] ◄──► [key_1] ◄── tail         │   │
//!   │   │           (MRU)                      (LRU)                   │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records (key, value, access count) live in the list's arena. The index is
//! a non-owning map from key to arena slot; both are updated in the same
//! call whenever a record is linked or unlinked.
//!
//! ## Operations
//!
//! | Operation            | Effect                                   | Cost |
//! |----------------------|------------------------------------------|------|
//! | `put` (new key)      | link at MRU, evict LRU if full           | O(1) |
//! | `put` (existing key) | replace value, move to MRU               | O(1) |
//! | `get` hit            | bump access count, move to MRU           | O(1) |
//! | `peek`               | read value, order untouched              | O(1) |
//! | `remove`             | unlink + drop index entry                | O(1) |
//! | `set_capacity`       | evict from LRU end until it fits         | O(k) |
//!
//! A capacity of zero rejects every `put`.
//!
//! ## Example
//!
//! ```
//! use raincache::policy::lru::LruCache;
//! use raincache::traits::Cache;
//!
//! let cache = LruCache::new(2);
//! cache.put(1, 1);
//! cache.put(2, 2);
//! cache.get(&1);
//! cache.put(3, 3);
//!
//! assert!(cache.contains(&1));
//! assert!(!cache.contains(&2));
//! assert!(cache.contains(&3));
//! ```
//!
//! ## Thread Safety
//!
//! `LruCore` is single-threaded (`&mut self`). `LruCache` puts it behind one
//! `parking_lot::RwLock`: `put`/`get`/`remove` take the write lock because
//! they reorder the list, `peek`/`contains`/`len` take the read lock.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::record::Record;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::traits::{Cache, ConcurrentCache, MutableCache, PutOutcome};

/// Single-threaded LRU store.
///
/// Front of the list is most recently used; eviction takes the back.
pub struct LruCore<K, V> {
    list: IntrusiveList<Record<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or updates `key` and marks it most recently used.
    pub fn put(&mut self, key: K, value: V) -> PutOutcome {
        self.put_with_eviction(key, value).0
    }

    /// Like [`put`](Self::put), but also hands back the entry that was
    /// evicted to make room, if any.
    ///
    /// ```
    /// use raincache::policy::lru::LruCore;
    /// use raincache::traits::PutOutcome;
    ///
    /// let mut core = LruCore::new(1);
    /// assert_eq!(core.put_with_eviction("a", 1), (PutOutcome::Inserted, None));
    /// assert_eq!(
    ///     core.put_with_eviction("b", 2),
    ///     (PutOutcome::Inserted, Some(("a", 1)))
    /// );
    /// ```
    pub fn put_with_eviction(&mut self, key: K, value: V) -> (PutOutcome, Option<(K, V)>) {
        if self.capacity == 0 {
            return (PutOutcome::Rejected, None);
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(record) = self.list.get_mut(id) {
                record.value = value;
            }
            self.list.move_to_front(id);
            return (PutOutcome::Updated, None);
        }

        let evicted = if self.index.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let id = self.list.push_front(Record::new(key.clone(), value));
        self.index.insert(key, id);
        (PutOutcome::Inserted, evicted)
    }

    /// Returns the value for `key`, marking it most recently used.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_record(key).map(|record| &record.value)
    }

    /// Returns the whole record for `key` after bumping its access count and
    /// moving it to the MRU position.
    pub fn get_record(&mut self, key: &K) -> Option<&Record<K, V>> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        let record = self.list.get_mut(id)?;
        record.touch();
        Some(&*record)
    }

    /// Returns the value for `key` without touching recency or counts.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.peek_record(key).map(|record| &record.value)
    }

    pub fn peek_record(&self, key: &K) -> Option<&Record<K, V>> {
        let id = *self.index.get(key)?;
        self.list.get(id)
    }

    /// Moves `key` to the MRU position without counting an access.
    ///
    /// Returns `false` if `key` is not resident.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Replaces the value of a resident key in place. Order and access
    /// count are untouched. Returns the old value.
    pub fn replace_value(&mut self, key: &K, value: V) -> Option<V> {
        let id = *self.index.get(key)?;
        let record = self.list.get_mut(id)?;
        Some(std::mem::replace(&mut record.value, value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let record = self.list.pop_back()?;
        self.index.remove(&record.key);
        Some(record.into_pair())
    }

    /// The entry `pop_lru` would return next.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|record| (&record.key, &record.value))
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|record| record.value)
    }

    /// Changes the capacity, evicting from the LRU end until the store fits.
    ///
    /// Returns the evicted entries, least recently used first.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<(K, V)> {
        let mut evicted = Vec::new();
        while self.index.len() > capacity {
            match self.pop_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        self.capacity = capacity;
        evicted
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|record| (&record.key, &record.value))
    }

    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|record| &record.key)
    }

    /// Verifies that the index and the recency list agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "lru index holds {} keys, list holds {}",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lru holds {} entries over capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(record) if record.key == *key => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "lru index slot {:?} does not hold its key",
                        id
                    )));
                },
            }
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Thread-safe LRU cache.
///
/// Cloning yields another handle to the same cache.
#[derive(Clone)]
pub struct LruCache<K, V> {
    inner: Arc<RwLock<LruCore<K, V>>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// ```
    /// use raincache::policy::lru::LruCache;
    /// use raincache::traits::Cache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "creating lru cache");
        Self {
            inner: Arc::new(RwLock::new(LruCore::new(capacity))),
        }
    }

    /// Reads a value without changing recency. Takes the read lock only.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.read().peek(key).cloned()
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.write().pop_lru()
    }

    pub fn peek_lru(&self) -> Option<(K, V)> {
        self.inner
            .read()
            .peek_lru()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    pub fn touch(&self, key: &K) -> bool {
        self.inner.write().touch(key)
    }

    /// Inserts or updates, returning the entry evicted to make room.
    pub fn put_with_eviction(&self, key: K, value: V) -> (PutOutcome, Option<(K, V)>) {
        self.inner.write().put_with_eviction(key, value)
    }

    pub fn set_capacity(&self, capacity: usize) -> Vec<(K, V)> {
        self.inner.write().set_capacity(capacity)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Snapshot of all entries, most recently used first.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> bool {
        self.inner.write().put(key, value).is_accepted()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.write().get(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }

    fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }
}

impl<K, V> ConcurrentCache for LruCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.read();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
