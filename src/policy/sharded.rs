//! # Hash-sharded caches
//!
//! Splits one logical cache into `N` independent caches, each behind its own
//! lock, and routes every key to `hash(key) % N`.
//!
//! ```text
//!                         put / get / remove (key)
//!                                  │
//!                      ShardSelector::shard_for_key
//!                                  │
//!        ┌──────────────┬──────────┴───┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!   ┌─────────┐    ┌─────────┐    ┌─────────┐    ┌─────────┐
//!   │ shard 0 │    │ shard 1 │    │ shard 2 │    │ shard 3 │
//!   │ LruCache│    │ LruCache│    │ LruCache│    │ LruCache│
//!   └─────────┘    └─────────┘    └─────────┘    └─────────┘
//!      ceil(capacity / N) entries each, one lock each
//! ```
//!
//! Keys on different shards never contend. The price is that ordering is
//! exact only inside a shard (there is no global LRU or LFU order) and that
//! the effective capacity is `N * ceil(capacity / N)`, which rounds up.
//!
//! ## Example
//!
//! ```
//! use raincache::policy::sharded::ShardedLruCache;
//! use raincache::traits::Cache;
//!
//! let cache: ShardedLruCache<u64, String> = ShardedLruCache::with_shards(100, 4);
//! assert_eq!(cache.shard_count(), 4);
//! assert_eq!(cache.shard_capacity(), 25);
//!
//! cache.put(7, "seven".to_string());
//! let shard = cache.shard_for_key(&7);
//! assert!(cache.shard(shard).is_some_and(|s| s.contains(&7)));
//! ```

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use tracing::debug;

use crate::ds::shard::{ShardSelector, default_shard_count, shard_capacity};
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::{Cache, ConcurrentCache, MutableCache};

const SHARD_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// A fixed set of independently locked caches addressed by key hash.
///
/// `K` is the key type every shard stores; routing only accepts `&K`, so a
/// lookup always hashes the same type the shards were filled with.
pub struct ShardedCache<K, S> {
    shards: Vec<S>,
    selector: ShardSelector,
    shard_capacity: usize,
    _key: PhantomData<fn(&K)>,
}

/// Sharded [`LruCache`].
pub type ShardedLruCache<K, V> = ShardedCache<K, LruCache<K, V>>;

/// Sharded [`LfuCache`].
pub type ShardedLfuCache<K, V> = ShardedCache<K, LfuCache<K, V>>;

impl<K: Hash, S> ShardedCache<K, S> {
    /// Builds `shards` caches with `make(per_shard_capacity)`.
    ///
    /// `shards == 0` uses the available hardware parallelism.
    pub fn from_fn(capacity: usize, shards: usize, mut make: impl FnMut(usize) -> S) -> Self {
        let shards = if shards == 0 {
            default_shard_count()
        } else {
            shards
        };
        let per_shard = shard_capacity(capacity, shards);
        debug!(capacity, shards, per_shard, "creating sharded cache");

        Self {
            shards: (0..shards).map(|_| make(per_shard)).collect(),
            selector: ShardSelector::new(shards, SHARD_SEED),
            shard_capacity: per_shard,
            _key: PhantomData,
        }
    }

    /// Like [`from_fn`](Self::from_fn) for shard constructors that can fail.
    /// The first error aborts construction.
    pub fn try_from_fn<E>(
        capacity: usize,
        shards: usize,
        mut make: impl FnMut(usize) -> Result<S, E>,
    ) -> Result<Self, E> {
        let shards = if shards == 0 {
            default_shard_count()
        } else {
            shards
        };
        let per_shard = shard_capacity(capacity, shards);
        let built = (0..shards)
            .map(|_| make(per_shard))
            .collect::<Result<Vec<_>, E>>()?;
        debug!(capacity, shards, per_shard, "creating sharded cache");

        Ok(Self {
            shards: built,
            selector: ShardSelector::new(shards, SHARD_SEED),
            shard_capacity: per_shard,
            _key: PhantomData,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Capacity of each individual shard.
    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    /// Index of the shard that owns `key`.
    pub fn shard_for_key(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    pub fn shard(&self, index: usize) -> Option<&S> {
        self.shards.get(index)
    }

    pub fn shards(&self) -> &[S] {
        &self.shards
    }

    fn shard_of(&self, key: &K) -> &S {
        &self.shards[self.selector.shard_for_key(key)]
    }
}

impl<K, V> ShardedCache<K, LruCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// One shard per hardware thread.
    pub fn new(capacity: usize) -> Self {
        Self::with_shards(capacity, 0)
    }

    pub fn with_shards(capacity: usize, shards: usize) -> Self {
        Self::from_fn(capacity, shards, LruCache::new)
    }
}

impl<K, V> ShardedCache<K, LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// One shard per hardware thread.
    pub fn new(capacity: usize) -> Self {
        Self::with_shards(capacity, 0)
    }

    pub fn with_shards(capacity: usize, shards: usize) -> Self {
        Self::from_fn(capacity, shards, LfuCache::new)
    }
}

impl<K, V, S> Cache<K, V> for ShardedCache<K, S>
where
    K: Hash,
    S: Cache<K, V>,
{
    fn put(&self, key: K, value: V) -> bool {
        self.shard_of(&key).put(key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard_of(key).get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.shard_of(key).contains(key)
    }

    /// Sum over shards. Not a consistent snapshot under concurrent writes.
    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Effective capacity: `shard_count * shard_capacity`.
    fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.capacity()).sum()
    }
}

impl<K, V, S> MutableCache<K, V> for ShardedCache<K, S>
where
    K: Hash,
    S: MutableCache<K, V>,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.shard_of(key).remove(key)
    }
}

impl<K, S: ConcurrentCache> ConcurrentCache for ShardedCache<K, S> {}

impl<K, S: Clone> Clone for ShardedCache<K, S> {
    fn clone(&self) -> Self {
        Self {
            shards: self.shards.clone(),
            selector: self.selector.clone(),
            shard_capacity: self.shard_capacity,
            _key: PhantomData,
        }
    }
}

impl<K, S> fmt::Debug for ShardedCache<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shards.len())
            .field("shard_capacity", &self.shard_capacity)
            .finish_non_exhaustive()
    }
}
