//! Throughput of every policy behind the builder under three access shapes:
//! uniform keys, a skewed hot set, and a one-pass scan mixed with hot keys.

use std::hint::black_box;
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use raincache::builder::{CacheBuilder, CachePolicy};
use raincache::traits::Cache;

const CAPACITY: usize = 4096;
const UNIVERSE: u64 = 16_384;
const OPS: u64 = 50_000;
const SEED: u64 = 0x5eed;

fn policies() -> Vec<CachePolicy> {
    vec![
        CachePolicy::Lru,
        CachePolicy::Lfu,
        CachePolicy::LruK {
            history_capacity: CAPACITY * 2,
            k: 2,
        },
        CachePolicy::Arc {
            transform_threshold: 2,
        },
        CachePolicy::ShardedLru { shards: 8 },
        CachePolicy::ShardedLfu { shards: 8 },
    ]
}

// =============================================================================
// Workloads
// =============================================================================

#[derive(Clone, Copy)]
enum Workload {
    Uniform,
    /// 90% of accesses land on 10% of the universe.
    HotSet,
    /// Hot-set traffic interleaved with a sequential sweep of cold keys.
    Scan,
}

impl Workload {
    fn name(self) -> &'static str {
        match self {
            Workload::Uniform => "uniform",
            Workload::HotSet => "hotset",
            Workload::Scan => "scan",
        }
    }

    fn keys(self, count: u64, seed: u64) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let hot = UNIVERSE / 10;
        let mut sweep = UNIVERSE;
        (0..count)
            .map(|i| match self {
                Workload::Uniform => rng.random_range(0..UNIVERSE),
                Workload::HotSet => {
                    if rng.random_range(0..100) < 90 {
                        rng.random_range(0..hot)
                    } else {
                        rng.random_range(hot..UNIVERSE)
                    }
                },
                Workload::Scan => {
                    if i % 2 == 0 {
                        sweep += 1;
                        sweep
                    } else {
                        rng.random_range(0..hot)
                    }
                },
            })
            .collect()
    }
}

/// Read-through: a miss is followed by a put.
fn run_read_through(cache: &impl Cache<u64, u64>, keys: &[u64]) -> u64 {
    let mut hits = 0;
    for &key in keys {
        if black_box(cache.get(&key)).is_some() {
            hits += 1;
        } else {
            cache.put(key, key);
        }
    }
    hits
}

// =============================================================================
// Single-threaded
// =============================================================================

fn bench_workloads(c: &mut Criterion) {
    for workload in [Workload::Uniform, Workload::HotSet, Workload::Scan] {
        let mut group = c.benchmark_group(format!("read_through_{}", workload.name()));
        group.throughput(Throughput::Elements(OPS));
        let keys = workload.keys(OPS, SEED);

        for policy in policies() {
            group.bench_with_input(
                BenchmarkId::from_parameter(policy.name()),
                &policy,
                |b, policy| {
                    b.iter_custom(|iters| {
                        let cache = CacheBuilder::new(CAPACITY).build::<u64, u64>(policy.clone());
                        let mut total = Duration::ZERO;
                        for _ in 0..iters {
                            let start = Instant::now();
                            black_box(run_read_through(&cache, &keys));
                            total += start.elapsed();
                        }
                        total
                    })
                },
            );
        }
        group.finish();
    }
}

fn report_hit_rates(_c: &mut Criterion) {
    for workload in [Workload::Uniform, Workload::HotSet, Workload::Scan] {
        let keys = workload.keys(OPS, SEED);
        for policy in policies() {
            let cache = CacheBuilder::new(CAPACITY).build::<u64, u64>(policy.clone());
            run_read_through(&cache, &keys);
            let hits = run_read_through(&cache, &keys);
            println!(
                "{}/{}: hit={:.2}%",
                policy.name(),
                workload.name(),
                hits as f64 / OPS as f64 * 100.0
            );
        }
    }
}

// =============================================================================
// Contended
// =============================================================================

fn bench_contended(c: &mut Criterion) {
    const THREADS: usize = 4;

    let mut group = c.benchmark_group("contended_hotset");
    group.throughput(Throughput::Elements(OPS * THREADS as u64));
    let key_sets: Vec<Arc<Vec<u64>>> = (0..THREADS as u64)
        .map(|t| Arc::new(Workload::HotSet.keys(OPS, SEED + t)))
        .collect();

    for policy in policies() {
        group.bench_with_input(
            BenchmarkId::from_parameter(policy.name()),
            &policy,
            |b, policy| {
                b.iter_custom(|iters| {
                    let cache = CacheBuilder::new(CAPACITY).build::<u64, u64>(policy.clone());
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let barrier = Arc::new(Barrier::new(THREADS + 1));
                        let handles: Vec<_> = key_sets
                            .iter()
                            .map(|keys| {
                                let cache = cache.clone();
                                let keys = Arc::clone(keys);
                                let barrier = Arc::clone(&barrier);
                                std::thread::spawn(move || {
                                    barrier.wait();
                                    run_read_through(&cache, &keys)
                                })
                            })
                            .collect();
                        let start = Instant::now();
                        barrier.wait();
                        for handle in handles {
                            black_box(handle.join().unwrap_or(0));
                        }
                        total += start.elapsed();
                    }
                    total
                })
            },
        );
    }
    group.finish();
}

criterion_group!(single_threaded, bench_workloads, report_hit_rates);
criterion_group!(contended, bench_contended);
criterion_main!(single_threaded, contended);
