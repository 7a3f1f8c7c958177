//! raincache: thread-safe cache replacement policies behind one `put`/`get`
//! contract.
//!
//! Policies: LRU, LFU with frequency decay, LRU-K, ARC, and hash-sharded
//! wrappers over LRU and LFU. Every policy has a single-threaded core
//! (`&mut self`) and a cloneable handle that guards it with a
//! `parking_lot::RwLock`.
//!
//! ```
//! use raincache::prelude::*;
//!
//! let cache = ArcCache::new(64);
//! cache.put("k", 1);
//! assert_eq!(cache.get(&"k"), Some(1));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::builder::{CacheBuilder, CachePolicy, PolicyCache};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::traits::{Cache, ConcurrentCache, MutableCache, PutOutcome};
