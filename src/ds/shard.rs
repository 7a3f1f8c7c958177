//! Key-to-shard routing for the sharded caches.
//!
//! ```text
//!   key ──► DefaultHasher(seed, key) ──► hash % shards ──► shard index
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │   one lock each
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The same `(seed, shards, key)` always selects the same shard, so every
//! operation on a key is serialized by exactly one shard lock.
//!
//! ```
//! use raincache::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// Deterministic shard selector using a seeded hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector over `shards` shards. Zero is clamped to one.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps `key` to a shard index in `[0, shard_count())`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(default_shard_count(), 0)
    }
}

/// Number of hardware threads, or one if that cannot be determined.
pub fn default_shard_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Per-shard capacity: `ceil(total / shards)`.
///
/// The sharded cache may therefore hold up to `shards * ceil(total / shards)`
/// entries, slightly more than `total` when it does not divide evenly.
pub fn shard_capacity(total: usize, shards: usize) -> usize {
    total.div_ceil(shards.max(1))
}
