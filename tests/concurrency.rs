// ==============================================
// CONCURRENCY TESTS (integration)
// ==============================================
//
// Every handle is shared between threads by cloning. After the workers
// join, the structure must be internally consistent and within capacity.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use raincache::builder::{CacheBuilder, CachePolicy};
use raincache::policy::arc::ArcCache;
use raincache::policy::lfu::LfuCache;
use raincache::policy::lru::LruCache;
use raincache::policy::lru_k::LrukCache;
use raincache::policy::sharded::ShardedLruCache;
use raincache::traits::{Cache, ConcurrentCache, MutableCache};

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

fn hammer<C>(cache: C, key_space: u64)
where
    C: Cache<u64, u64> + Clone + Send + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let cache = cache.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS_PER_THREAD {
                    let key = ((thread_id * 31 + i * 7) as u64) % key_space;
                    match i % 4 {
                        0 | 1 => {
                            cache.put(key, key * 2);
                        },
                        _ => {
                            if let Some(value) = cache.get(&key) {
                                assert_eq!(value, key * 2);
                            }
                        },
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(cache.len() <= cache.capacity());
}

mod per_policy {
    use super::*;

    #[test]
    fn lru_under_contention() {
        let cache = LruCache::new(64);
        hammer(cache.clone(), 256);
        cache.check_invariants().unwrap();
        assert_eq!(cache.len(), 64);
    }

    #[test]
    fn lfu_under_contention() {
        let cache = LfuCache::new(64);
        hammer(cache.clone(), 256);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn lru_k_under_contention() {
        let cache = LrukCache::with_history(64, 128, 2);
        hammer(cache.clone(), 256);
        cache.check_invariants().unwrap();
        assert!(cache.pending_len() <= cache.history_len());
    }

    #[test]
    fn arc_under_contention() {
        let cache = ArcCache::new(64);
        hammer(cache.clone(), 256);
        cache.check_invariants().unwrap();
        assert_eq!(cache.lru_capacity() + cache.lfu_capacity(), 128);
    }

    #[test]
    fn sharded_under_contention() {
        let cache: ShardedLruCache<u64, u64> = ShardedLruCache::with_shards(64, 8);
        hammer(cache.clone(), 256);
        for shard in cache.shards() {
            shard.check_invariants().unwrap();
        }
    }

    #[test]
    fn builder_caches_are_shareable() {
        for policy in [
            CachePolicy::Lru,
            CachePolicy::Arc {
                transform_threshold: 2,
            },
            CachePolicy::ShardedLfu { shards: 0 },
        ] {
            hammer(CacheBuilder::new(32).build::<u64, u64>(policy), 128);
        }
    }
}

mod handles {
    use super::*;

    fn assert_concurrent<C: ConcurrentCache>(_: &C) {}

    #[test]
    fn every_handle_is_send_and_sync() {
        assert_concurrent(&LruCache::<u64, u64>::new(1));
        assert_concurrent(&LfuCache::<u64, u64>::new(1));
        assert_concurrent(&LrukCache::<u64, u64>::new(1));
        assert_concurrent(&ArcCache::<u64, u64>::new(1));
        assert_concurrent(&ShardedLruCache::<u64, u64>::new(1));
        assert_concurrent(&CacheBuilder::new(1).build::<u64, u64>(CachePolicy::Lfu));
    }

    #[test]
    fn removal_races_are_exclusive() {
        let cache = LruCache::new(1_024);
        for key in 0..1_000u64 {
            cache.put(key, key);
        }

        let removed = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = cache.clone();
                let removed = Arc::clone(&removed);
                thread::spawn(move || {
                    for key in 0..1_000u64 {
                        if cache.remove(&key).is_some() {
                            removed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(removed.load(Ordering::Relaxed), 1_000);
        assert!(cache.is_empty());
    }
}
