//! Eviction policies.
//!
//! | Module    | Policy                      | Thread-safe handle        |
//! |-----------|-----------------------------|---------------------------|
//! | `lru`     | Least recently used         | `LruCache`                |
//! | `lfu`     | Least frequently used+decay | `LfuCache`                |
//! | `lru_k`   | LRU with K-access admission | `LrukCache`               |
//! | `arc`     | Adaptive replacement        | `ArcCache`                |
//! | `sharded` | Hash-sharded LRU / LFU      | `ShardedCache<K, S>`      |

pub mod arc;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded;
