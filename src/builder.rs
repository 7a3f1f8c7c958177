//! Unified cache builder for all eviction policies.
//!
//! Picks a policy at runtime and hides which concrete cache sits behind it,
//! which is what a trace-replay driver wants: one code path, any policy.
//!
//! ## Example
//!
//! ```rust
//! use raincache::builder::{CacheBuilder, CachePolicy};
//! use raincache::traits::Cache;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::{
    DEFAULT_DECAY_FACTOR, LfuCache, default_decay_interval, validate_decay_factor,
};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::policy::sharded::{ShardedLfuCache, ShardedLruCache};
use crate::traits::{Cache, ConcurrentCache, MutableCache};

/// Available cache eviction policies.
#[derive(Debug, Clone, PartialEq)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction with frequency decay.
    Lfu,
    /// LRU admission after `k` accesses seen within a history of
    /// `history_capacity` keys.
    LruK { history_capacity: usize, k: u64 },
    /// Adaptive Replacement Cache.
    Arc { transform_threshold: u64 },
    /// LRU split over `shards` independently locked shards (0 = one per
    /// hardware thread).
    ShardedLru { shards: usize },
    /// LFU split over `shards` independently locked shards (0 = one per
    /// hardware thread).
    ShardedLfu { shards: usize },
}

impl CachePolicy {
    /// Short lowercase name, suitable for reports.
    pub fn name(&self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::Lfu => "lfu",
            CachePolicy::LruK { .. } => "lru-k",
            CachePolicy::Arc { .. } => "arc",
            CachePolicy::ShardedLru { .. } => "sharded-lru",
            CachePolicy::ShardedLfu { .. } => "sharded-lfu",
        }
    }
}

/// A cache of any policy behind one type.
///
/// ARC has no removal; [`MutableCache::remove`] on an ARC-backed cache is a
/// no-op that returns `None`.
#[derive(Clone)]
pub struct PolicyCache<K, V> {
    policy: CachePolicy,
    inner: PolicyInner<K, V>,
}

#[derive(Clone)]
enum PolicyInner<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    LruK(LrukCache<K, V>),
    Arc(ArcCache<K, V>),
    ShardedLru(ShardedLruCache<K, V>),
    ShardedLfu(ShardedLfuCache<K, V>),
}

impl<K, V> PolicyCache<K, V> {
    /// The policy this cache was built with.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

impl<K, V> Cache<K, V> for PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> bool {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.put(key, value),
            PolicyInner::Lfu(lfu) => lfu.put(key, value),
            PolicyInner::LruK(lruk) => lruk.put(key, value),
            PolicyInner::Arc(arc) => arc.put(key, value),
            PolicyInner::ShardedLru(sharded) => sharded.put(key, value),
            PolicyInner::ShardedLfu(sharded) => sharded.put(key, value),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.get(key),
            PolicyInner::Lfu(lfu) => lfu.get(key),
            PolicyInner::LruK(lruk) => lruk.get(key),
            PolicyInner::Arc(arc) => arc.get(key),
            PolicyInner::ShardedLru(sharded) => sharded.get(key),
            PolicyInner::ShardedLfu(sharded) => sharded.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.contains(key),
            PolicyInner::Lfu(lfu) => lfu.contains(key),
            PolicyInner::LruK(lruk) => lruk.contains(key),
            PolicyInner::Arc(arc) => arc.contains(key),
            PolicyInner::ShardedLru(sharded) => sharded.contains(key),
            PolicyInner::ShardedLfu(sharded) => sharded.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.len(),
            PolicyInner::Lfu(lfu) => lfu.len(),
            PolicyInner::LruK(lruk) => lruk.len(),
            PolicyInner::Arc(arc) => arc.len(),
            PolicyInner::ShardedLru(sharded) => sharded.len(),
            PolicyInner::ShardedLfu(sharded) => sharded.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.capacity(),
            PolicyInner::Lfu(lfu) => lfu.capacity(),
            PolicyInner::LruK(lruk) => lruk.capacity(),
            PolicyInner::Arc(arc) => arc.capacity(),
            PolicyInner::ShardedLru(sharded) => sharded.capacity(),
            PolicyInner::ShardedLfu(sharded) => sharded.capacity(),
        }
    }
}

impl<K, V> MutableCache<K, V> for PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.remove(key),
            PolicyInner::Lfu(lfu) => lfu.remove(key),
            PolicyInner::LruK(lruk) => lruk.remove(key),
            PolicyInner::Arc(_) => None,
            PolicyInner::ShardedLru(sharded) => sharded.remove(key),
            PolicyInner::ShardedLfu(sharded) => sharded.remove(key),
        }
    }
}

impl<K, V> ConcurrentCache for PolicyCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}

/// Builder for creating cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    lfu_decay: Option<(f64, u64)>,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lfu_decay: None,
        }
    }

    /// Decay settings for the LFU-based policies. Without this, LFU caches
    /// use a factor of 2.0 and an interval scaled to their capacity.
    pub fn lfu_decay(mut self, decay_factor: f64, decay_interval: u64) -> Self {
        self.lfu_decay = Some((decay_factor, decay_interval));
        self
    }

    /// Build a cache with the specified policy.
    ///
    /// # Panics
    ///
    /// Panics on invalid policy parameters; see [`try_build`](Self::try_build).
    ///
    /// # Example
    ///
    /// ```rust
    /// use raincache::builder::{CacheBuilder, CachePolicy};
    /// use raincache::traits::Cache;
    ///
    /// let lru_k = CacheBuilder::new(100).build::<u64, String>(CachePolicy::LruK {
    ///     history_capacity: 200,
    ///     k: 2,
    /// });
    /// let arc = CacheBuilder::new(100)
    ///     .build::<u64, String>(CachePolicy::Arc { transform_threshold: 2 });
    /// assert_eq!(arc.capacity(), 200);
    /// assert_eq!(lru_k.capacity(), 100);
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> PolicyCache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build a cache, rejecting `k == 0`, `transform_threshold == 0` and
    /// decay factors that are not finite or below 1.0.
    ///
    /// ```rust
    /// use raincache::builder::{CacheBuilder, CachePolicy};
    ///
    /// let err = CacheBuilder::new(10)
    ///     .try_build::<u64, u64>(CachePolicy::LruK { history_capacity: 10, k: 0 });
    /// assert!(err.is_err());
    /// ```
    pub fn try_build<K, V>(self, policy: CachePolicy) -> Result<PolicyCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        if let Some((decay_factor, _)) = self.lfu_decay {
            validate_decay_factor(decay_factor)?;
        }
        let capacity = self.capacity;
        let lfu_decay = self.lfu_decay;
        let make_lfu = move |cap: usize| {
            let (decay_factor, decay_interval) =
                lfu_decay.unwrap_or((DEFAULT_DECAY_FACTOR, default_decay_interval(cap)));
            LfuCache::try_with_decay(cap, decay_factor, decay_interval)
        };

        let inner = match policy.clone() {
            CachePolicy::Lru => PolicyInner::Lru(LruCache::new(capacity)),
            CachePolicy::Lfu => PolicyInner::Lfu(make_lfu(capacity)?),
            CachePolicy::LruK {
                history_capacity,
                k,
            } => PolicyInner::LruK(LrukCache::try_with_history(capacity, history_capacity, k)?),
            CachePolicy::Arc {
                transform_threshold,
            } => PolicyInner::Arc(ArcCache::try_with_threshold(capacity, transform_threshold)?),
            CachePolicy::ShardedLru { shards } => {
                PolicyInner::ShardedLru(ShardedLruCache::with_shards(capacity, shards))
            },
            CachePolicy::ShardedLfu { shards } => {
                PolicyInner::ShardedLfu(ShardedLfuCache::try_from_fn(capacity, shards, make_lfu)?)
            },
        };

        Ok(PolicyCache { policy, inner })
    }
}
