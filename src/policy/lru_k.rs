//! # LRU-K: admission after K accesses
//!
//! A key has to be seen `k` times within a bounded history window before it
//! is admitted to the main LRU store. One-off scans therefore pass through
//! without displacing the working set.
//!
//! ```text
//!   put / get (key)
//!        │
//!        ▼
//!   ┌──────────────────┐  hit   ┌──────────────────────────────┐
//!   │ main: LruCore    │──────► │ serve / update in place       │
//!   └──────────────────┘        └──────────────────────────────┘
//!        │ miss
//!        ▼
//!   ┌──────────────────┐        count = history[key] + 1
//!   │ history: LruCore │        (bounded; evicting a key also drops its
//!   │   <K, u64>       │         pending value)
//!   └──────────────────┘
//!        │
//!        ├── count <  k ─► pending[key] = value           (Staged)
//!        └── count >= k ─► move pending value into main    (Inserted)
//! ```
//!
//! `get` records an access in the history even when the key is already in
//! main. With `k == 1` every `put` promotes immediately and the cache behaves
//! like a plain LRU.
//!
//! ## Example
//!
//! ```
//! use raincache::policy::lru_k::LrukCache;
//! use raincache::traits::Cache;
//!
//! let cache = LrukCache::with_history(8, 16, 2);
//! cache.put("page", 1);
//! assert!(!cache.contains(&"page"));
//!
//! assert_eq!(cache.get(&"page"), Some(1));
//! assert!(cache.contains(&"page"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{ConfigError, InvariantError};
use crate::policy::lru::LruCore;
use crate::traits::{Cache, ConcurrentCache, MutableCache, PutOutcome};

/// Default number of accesses required for admission.
pub const DEFAULT_K: u64 = 2;

/// Single-threaded LRU-K store.
pub struct LrukCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, u64>,
    pending: FxHashMap<K, V>,
    k: u64,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        match Self::try_new(capacity, history_capacity, k) {
            Ok(core) => core,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(capacity: usize, history_capacity: usize, k: u64) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("k must be at least 1"));
        }
        Ok(Self {
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            pending: FxHashMap::with_capacity_and_hasher(history_capacity, Default::default()),
            k,
        })
    }

    pub fn k(&self) -> u64 {
        self.k
    }

    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Entries admitted to the main store.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Keys currently tracked in the access history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Values waiting for their key to reach `k` accesses.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `key` has been admitted to the main store.
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Recorded access count for a key that has not been promoted.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.history.peek(key).copied()
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.main.peek(key)
    }

    pub fn put(&mut self, key: K, value: V) -> PutOutcome {
        if self.main.capacity() == 0 {
            return PutOutcome::Rejected;
        }
        if self.main.contains(&key) {
            return self.main.put(key, value);
        }

        let (count, tracked) = self.record_access(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.pending.remove(&key);
            trace!(count, "lru-k promotion on put");
            return self.main.put(key, value);
        }
        if !tracked {
            return PutOutcome::Rejected;
        }
        self.pending.insert(key, value);
        PutOutcome::Staged
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let resident = self.main.contains(key);
        let (count, _) = self.record_access(key);
        if resident {
            return self.main.get(key);
        }

        if count >= self.k
            && let Some(value) = self.pending.remove(key)
        {
            self.history.remove(key);
            self.main.put(key.clone(), value);
            trace!(count, "lru-k promotion on get");
            return self.main.peek(key);
        }
        None
    }

    /// Removes `key` from the main store and forgets its history.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.history.remove(key);
        self.pending.remove(key);
        self.main.remove(key)
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.history.clear();
        self.pending.clear();
    }

    /// Bumps the history count for `key`. Returns the new count and whether
    /// the history store accepted the key.
    fn record_access(&mut self, key: &K) -> (u64, bool) {
        let count = self
            .history
            .peek(key)
            .copied()
            .unwrap_or(0)
            .saturating_add(1);
        let (outcome, evicted) = self.history.put_with_eviction(key.clone(), count);
        if let Some((old_key, _)) = evicted {
            self.pending.remove(&old_key);
        }
        (count, outcome.is_accepted())
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;
        for key in self.pending.keys() {
            if !self.history.contains(key) {
                return Err(InvariantError::new(
                    "pending value held for a key missing from history",
                ));
            }
            if self.main.contains(key) {
                return Err(InvariantError::new(
                    "pending value held for a key already in main",
                ));
            }
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LrukCore")
            .field("k", &self.k)
            .field("len", &self.main.len())
            .field("capacity", &self.main.capacity())
            .field("history_len", &self.history.len())
            .field("pending_len", &self.pending.len())
            .finish()
    }
}

/// Thread-safe LRU-K cache. Main store, history and pending values share
/// one lock.
#[derive(Clone)]
pub struct LrukCache<K, V> {
    inner: Arc<RwLock<LrukCore<K, V>>>,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// History window equal to `capacity`, `k = 2`.
    pub fn new(capacity: usize) -> Self {
        Self::from_core(LrukCore {
            main: LruCore::new(capacity),
            history: LruCore::new(capacity),
            pending: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            k: DEFAULT_K,
        })
    }

    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn with_history(capacity: usize, history_capacity: usize, k: u64) -> Self {
        match Self::try_with_history(capacity, history_capacity, k) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_with_history(
        capacity: usize,
        history_capacity: usize,
        k: u64,
    ) -> Result<Self, ConfigError> {
        LrukCore::try_new(capacity, history_capacity, k).map(Self::from_core)
    }

    fn from_core(core: LrukCore<K, V>) -> Self {
        debug!(
            capacity = core.capacity(),
            history_capacity = core.history_capacity(),
            k = core.k(),
            "creating lru-k cache"
        );
        Self {
            inner: Arc::new(RwLock::new(core)),
        }
    }

    pub fn k(&self) -> u64 {
        self.inner.read().k()
    }

    pub fn history_len(&self) -> usize {
        self.inner.read().history_len()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.read().pending_len()
    }

    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.inner.read().access_count(key)
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.read().peek(key).cloned()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

impl<K, V> Cache<K, V> for LrukCache<K, V>
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

impl<K, V> MutableCache<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }
}

impl<K, V> ConcurrentCache for LrukCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}

impl<K, V> fmt::Debug for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.read();
        f.debug_struct("LrukCache")
            .field("k", &core.k())
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
