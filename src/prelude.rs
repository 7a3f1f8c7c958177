pub use crate::builder::{CacheBuilder, CachePolicy, PolicyCache};
pub use crate::ds::{GhostList, IntrusiveList, Record, ShardSelector, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::arc::{ArcCache, ArcLfuPart, ArcLruPart};
pub use crate::policy::lfu::{LfuCache, LfuCore};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::policy::lru_k::{LrukCache, LrukCore};
pub use crate::policy::sharded::{ShardedCache, ShardedLfuCache, ShardedLruCache};
pub use crate::traits::{Cache, ConcurrentCache, MutableCache, PutOutcome};
