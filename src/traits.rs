//! # Cache capability contract
//!
//! Every policy in this crate (LRU, LRU-K, LFU, ARC and the sharded
//! variants) is usable through the same small set of traits, so a driver
//! that replays an access trace can be written once and pointed at any of
//! them.
//!
//! ```text
//!            ┌───────────────────────────────────────────┐
//!            │              Cache<K, V>                  │
//!            │                                           │
//!            │  put(&self, K, V) → bool                  │
//!            │  get(&self, &K) → Option<V>               │
//!            │  get_or_default(&self, &K) → V            │
//!            │  contains / len / is_empty / capacity     │
//!            └─────────────────────┬─────────────────────┘
//!                                  │
//!            ┌─────────────────────▼─────────────────────┐
//!            │           MutableCache<K, V>              │
//!            │                                           │
//!            │  remove(&self, &K) → Option<V>            │
//!            └───────────────────────────────────────────┘
//!
//!   LruCache, LfuCache, LrukCache, ShardedCache  → Cache + MutableCache
//!   ArcCache                                     → Cache only
//! ```
//!
//! All methods take `&self`: each implementation owns its own lock (one per
//! store, one per shard, one per ARC partition), so a cache can be shared
//! between threads behind an `Arc` or by cloning the handle.
//!
//! The single-threaded cores (`LruCore`, `LfuCore`, ...) are not behind these
//! traits. They return a [`PutOutcome`] from `put` so that composed policies
//! can tell a genuinely new key from an update of an existing one.
//!
//! ## Example
//!
//! ```
//! use raincache::policy::lru::LruCache;
//! use raincache::traits::{Cache, MutableCache};
//!
//! fn warm<C: Cache<u64, String>>(cache: &C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.to_string());
//!     }
//! }
//!
//! let cache = LruCache::new(16);
//! warm(&cache, &[(1, "one"), (2, "two")]);
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//! assert_eq!(cache.get_or_default(&3), String::new());
//!
//! cache.remove(&1);
//! cache.remove(&1);
//! assert!(!cache.contains(&1));
//! ```

/// What a `put` on a single-threaded core did with the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was not resident and now is.
    Inserted,
    /// The key was resident; its value was replaced.
    Updated,
    /// The value was accepted but parked outside the main store (LRU-K keys
    /// that have not yet reached `k` accesses).
    Staged,
    /// Nothing was stored (capacity 0).
    Rejected,
}

impl PutOutcome {
    /// `true` unless the entry was rejected.
    #[inline]
    pub fn is_accepted(self) -> bool {
        self != PutOutcome::Rejected
    }

    /// `true` if the key became resident by this call.
    #[inline]
    pub fn is_new(self) -> bool {
        self == PutOutcome::Inserted
    }
}

/// Operations every policy supports.
pub trait Cache<K, V> {
    /// Inserts or updates `key`, marking it as accessed.
    ///
    /// Returns `false` if the cache rejected the entry (capacity 0).
    fn put(&self, key: K, value: V) -> bool;

    /// Looks up `key`, marking it as accessed on a hit.
    ///
    /// This is the authoritative lookup: `None` is a miss.
    fn get(&self, key: &K) -> Option<V>;

    /// Looks up `key`, returning `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Returns `true` if `key` is resident. Does not count as an access.
    fn contains(&self, key: &K) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;
}

/// Caches that support removal by key.
pub trait MutableCache<K, V>: Cache<K, V> {
    /// Removes `key` and returns its value. Removing an absent key is a
    /// no-op that returns `None`.
    fn remove(&self, key: &K) -> Option<V>;
}

/// Marker for cache handles that can be shared across threads.
///
/// ```
/// use raincache::policy::arc::ArcCache;
/// use raincache::traits::ConcurrentCache;
///
/// fn assert_concurrent<C: ConcurrentCache>(_: &C) {}
/// assert_concurrent(&ArcCache::<u64, u64>::new(8));
/// ```
pub trait ConcurrentCache: Send + Sync {}
