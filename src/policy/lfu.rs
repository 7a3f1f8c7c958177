//! # Least Frequently Used (LFU) Cache with decay
//!
//! Evicts the entry with the fewest recorded accesses. Plain LFU has a
//! well-known failure mode: a key that was hot long ago keeps a large count
//! and pins a slot forever. This store periodically *decays* outlying
//! counts back toward the running average so that stale keys eventually
//! lose to keys that are active now.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, Slot { freq, id }>
//!
//!   buckets: BTreeMap<u64, IntrusiveList<Record<K, V>>>
//!
//!   freq 1  ─► [k7] ◄──► [k3] ◄──► [k9]      ◄── pop_lfu takes the back
//!   freq 2  ─► [k1]                               of the lowest bucket
//!   freq 5  ─► [k4] ◄──► [k2]
//!   freq 40 ─► [k0]
//!          newest        oldest
//! ```
//!
//! A frequency bump unlinks the record from bucket `f` and pushes it at the
//! front of bucket `f + 1`; empty buckets are dropped. Ties inside a bucket
//! are broken by arrival: the record that joined the bucket first leaves
//! first.
//!
//! ## Decay
//!
//! Every `decay_interval` bumps (a `get` hit or a `put` on a resident key;
//! fresh inserts start at 1 and do not count):
//!
//! ```text
//!   average = total_frequency / len
//!   ceiling = max(1, ceil(average * decay_factor))
//!   every record above `ceiling` drops to `ceiling`
//! ```
//!
//! With the default factor of 2.0 a record only decays once it has more than
//! twice the average count. A `decay_interval` of 0 turns decay off.
//!
//! ## Example
//!
//! ```
//! use raincache::policy::lfu::LfuCache;
//! use raincache::traits::Cache;
//!
//! let cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::record::Record;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError};
use crate::traits::{Cache, ConcurrentCache, MutableCache, PutOutcome};

/// Default multiple of the average frequency a record may reach before a
/// decay pass lowers it.
pub const DEFAULT_DECAY_FACTOR: f64 = 2.0;

const MIN_DECAY_INTERVAL: u64 = 16;

/// Default number of bumps between decay passes for a given capacity.
pub fn default_decay_interval(capacity: usize) -> u64 {
    (capacity as u64).max(MIN_DECAY_INTERVAL)
}

pub(crate) fn validate_decay_factor(decay_factor: f64) -> Result<(), ConfigError> {
    if !decay_factor.is_finite() || decay_factor < 1.0 {
        return Err(ConfigError::new(format!(
            "decay_factor must be finite and at least 1.0, got {}",
            decay_factor
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    freq: u64,
    id: SlotId,
}

/// Single-threaded LFU store with frequency decay.
pub struct LfuCore<K, V> {
    buckets: BTreeMap<u64, IntrusiveList<Record<K, V>>>,
    index: FxHashMap<K, Slot>,
    capacity: usize,
    total_freq: u64,
    decay_factor: f64,
    decay_interval: u64,
    bumps_since_decay: u64,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a store with the default decay settings.
    pub fn new(capacity: usize) -> Self {
        Self::build(
            capacity,
            DEFAULT_DECAY_FACTOR,
            default_decay_interval(capacity),
        )
    }

    /// Creates a store with explicit decay settings.
    ///
    /// # Panics
    ///
    /// Panics if `decay_factor` is not finite or is below 1.0.
    pub fn with_decay(capacity: usize, decay_factor: f64, decay_interval: u64) -> Self {
        match Self::try_with_decay(capacity, decay_factor, decay_interval) {
            Ok(core) => core,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`with_decay`](Self::with_decay).
    ///
    /// ```
    /// use raincache::policy::lfu::LfuCore;
    ///
    /// assert!(LfuCore::<u64, u64>::try_with_decay(8, 1.5, 32).is_ok());
    /// assert!(LfuCore::<u64, u64>::try_with_decay(8, 0.5, 32).is_err());
    /// assert!(LfuCore::<u64, u64>::try_with_decay(8, f64::NAN, 32).is_err());
    /// ```
    pub fn try_with_decay(
        capacity: usize,
        decay_factor: f64,
        decay_interval: u64,
    ) -> Result<Self, ConfigError> {
        validate_decay_factor(decay_factor)?;
        Ok(Self::build(capacity, decay_factor, decay_interval))
    }

    fn build(capacity: usize, decay_factor: f64, decay_interval: u64) -> Self {
        Self {
            buckets: BTreeMap::new(),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            total_freq: 0,
            decay_factor,
            decay_interval,
            bumps_since_decay: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub fn decay_interval(&self) -> u64 {
        self.decay_interval
    }

    /// Current access count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|slot| slot.freq)
    }

    /// Mean access count over resident entries; 0.0 when empty.
    pub fn average_frequency(&self) -> f64 {
        if self.index.is_empty() {
            return 0.0;
        }
        self.total_freq as f64 / self.index.len() as f64
    }

    pub fn put(&mut self, key: K, value: V) -> PutOutcome {
        self.put_with_eviction(key, value).0
    }

    /// Inserts or updates `key`.
    ///
    /// Updating a resident key counts as an access. A new key starts at
    /// frequency 1 and, when the store is full, displaces the least
    /// frequently used entry, which is returned.
    pub fn put_with_eviction(&mut self, key: K, value: V) -> (PutOutcome, Option<(K, V)>) {
        if self.capacity == 0 {
            return (PutOutcome::Rejected, None);
        }

        if self.index.contains_key(&key) {
            self.replace_value(&key, value);
            self.bump(&key);
            return (PutOutcome::Updated, None);
        }

        let evicted = if self.index.len() >= self.capacity {
            self.pop_lfu()
        } else {
            None
        };

        let id = self
            .buckets
            .entry(1)
            .or_default()
            .push_front(Record::new(key.clone(), value));
        self.index.insert(key, Slot { freq: 1, id });
        self.total_freq += 1;
        (PutOutcome::Inserted, evicted)
    }

    /// Returns the value for `key`, counting the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.bump(key)?;
        self.peek(key)
    }

    /// Returns the value for `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = self.index.get(key)?;
        self.buckets
            .get(&slot.freq)
            .and_then(|bucket| bucket.get(slot.id))
            .map(|record| &record.value)
    }

    /// Overwrites the value of a resident key without counting an access.
    pub fn replace_value(&mut self, key: &K, value: V) -> Option<V> {
        let slot = *self.index.get(key)?;
        let record = self.buckets.get_mut(&slot.freq)?.get_mut(slot.id)?;
        Some(std::mem::replace(&mut record.value, value))
    }

    /// Removes and returns the least frequently used entry.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let mut lowest = self.buckets.first_entry()?;
        let freq = *lowest.key();
        let record = lowest.get_mut().pop_back()?;
        if lowest.get().is_empty() {
            lowest.remove();
        }
        self.index.remove(&record.key);
        self.total_freq -= freq;
        Some(record.into_pair())
    }

    /// The entry `pop_lfu` would return next, with its frequency.
    pub fn peek_lfu(&self) -> Option<(&K, &V, u64)> {
        let (&freq, bucket) = self.buckets.first_key_value()?;
        bucket
            .back()
            .map(|record| (&record.key, &record.value, freq))
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        let record = self.take_from_bucket(slot)?;
        self.total_freq -= slot.freq;
        Some(record.value)
    }

    /// Changes the capacity, evicting least frequently used entries until
    /// the store fits.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<(K, V)> {
        let mut evicted = Vec::new();
        while self.index.len() > capacity {
            match self.pop_lfu() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        self.capacity = capacity;
        evicted
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.index.clear();
        self.total_freq = 0;
        self.bumps_since_decay = 0;
    }

    /// Runs a decay pass now and returns how many records were lowered.
    ///
    /// ```
    /// use raincache::policy::lfu::LfuCore;
    ///
    /// let mut core = LfuCore::with_decay(4, 1.0, 0);
    /// core.put("hot", ());
    /// core.put("cold", ());
    /// for _ in 0..9 {
    ///     core.get(&"hot");
    /// }
    /// // average = (10 + 1) / 2 = 5.5, ceiling = 6
    /// assert_eq!(core.decay(), 1);
    /// assert_eq!(core.frequency(&"hot"), Some(6));
    /// assert_eq!(core.frequency(&"cold"), Some(1));
    /// ```
    pub fn decay(&mut self) -> usize {
        self.bumps_since_decay = 0;
        if self.index.is_empty() {
            return 0;
        }

        let average = self.average_frequency();
        let ceiling = ((average * self.decay_factor).ceil() as u64).max(1);
        let hot = self.buckets.split_off(&ceiling.saturating_add(1));

        let mut lowered = 0;
        for (freq, mut bucket) in hot {
            while let Some(mut record) = bucket.pop_back() {
                record.access_count = ceiling;
                let key = record.key.clone();
                let id = self.buckets.entry(ceiling).or_default().push_front(record);
                if let Some(slot) = self.index.get_mut(&key) {
                    *slot = Slot { freq: ceiling, id };
                }
                self.total_freq -= freq - ceiling;
                lowered += 1;
            }
        }

        trace!(average, ceiling, lowered, "lfu decay pass");
        lowered
    }

    fn bump(&mut self, key: &K) -> Option<u64> {
        let slot = *self.index.get(key)?;
        let mut record = self.take_from_bucket(slot)?;
        let freq = record.touch();

        let id = self.buckets.entry(freq).or_default().push_front(record);
        if let Some(entry) = self.index.get_mut(key) {
            *entry = Slot { freq, id };
        }
        self.total_freq += freq - slot.freq;

        if self.decay_interval > 0 {
            self.bumps_since_decay += 1;
            if self.bumps_since_decay >= self.decay_interval {
                self.decay();
            }
        }
        Some(freq)
    }

    fn take_from_bucket(&mut self, slot: Slot) -> Option<Record<K, V>> {
        let bucket = self.buckets.get_mut(&slot.freq)?;
        let record = bucket.remove(slot.id);
        if bucket.is_empty() {
            self.buckets.remove(&slot.freq);
        }
        record
    }

    /// Verifies bucket membership, counts and the running total.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut linked = 0usize;
        let mut total = 0u64;
        for (&freq, bucket) in &self.buckets {
            if bucket.is_empty() {
                return Err(InvariantError::new(format!("empty bucket for freq {}", freq)));
            }
            bucket.check_invariants()?;
            for (id, record) in bucket.iter_entries() {
                if record.access_count != freq {
                    return Err(InvariantError::new(format!(
                        "record in bucket {} has access count {}",
                        freq, record.access_count
                    )));
                }
                if self.index.get(&record.key) != Some(&Slot { freq, id }) {
                    return Err(InvariantError::new(format!(
                        "index does not point at record {:?} in bucket {}",
                        id, freq
                    )));
                }
                linked += 1;
                total += freq;
            }
        }

        if linked != self.index.len() {
            return Err(InvariantError::new(format!(
                "buckets hold {} records, index holds {}",
                linked,
                self.index.len()
            )));
        }
        if total != self.total_freq {
            return Err(InvariantError::new(format!(
                "total frequency is {}, buckets sum to {}",
                self.total_freq, total
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lfu holds {} entries over capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("buckets", &self.buckets.len())
            .field("average_frequency", &self.average_frequency())
            .field("decay_factor", &self.decay_factor)
            .field("decay_interval", &self.decay_interval)
            .finish()
    }
}

/// Thread-safe LFU cache.
#[derive(Clone)]
pub struct LfuCache<K, V> {
    inner: Arc<RwLock<LfuCore<K, V>>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "creating lfu cache");
        Self {
            inner: Arc::new(RwLock::new(LfuCore::new(capacity))),
        }
    }

    /// # Panics
    ///
    /// Panics if `decay_factor` is not finite or is below 1.0.
    pub fn with_decay(capacity: usize, decay_factor: f64, decay_interval: u64) -> Self {
        match Self::try_with_decay(capacity, decay_factor, decay_interval) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_with_decay(
        capacity: usize,
        decay_factor: f64,
        decay_interval: u64,
    ) -> Result<Self, ConfigError> {
        let core = LfuCore::try_with_decay(capacity, decay_factor, decay_interval)?;
        debug!(capacity, decay_factor, decay_interval, "creating lfu cache");
        Ok(Self {
            inner: Arc::new(RwLock::new(core)),
        })
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.read().peek(key).cloned()
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.read().frequency(key)
    }

    pub fn average_frequency(&self) -> f64 {
        self.inner.read().average_frequency()
    }

    pub fn pop_lfu(&self) -> Option<(K, V)> {
        self.inner.write().pop_lfu()
    }

    pub fn peek_lfu(&self) -> Option<(K, V, u64)> {
        self.inner
            .read()
            .peek_lfu()
            .map(|(key, value, freq)| (key.clone(), value.clone(), freq))
    }

    pub fn decay(&self) -> usize {
        self.inner.write().decay()
    }

    pub fn put_with_eviction(&self, key: K, value: V) -> (PutOutcome, Option<(K, V)>) {
        self.inner.write().put_with_eviction(key, value)
    }

    pub fn replace_value(&self, key: &K, value: V) -> Option<V> {
        self.inner.write().replace_value(key, value)
    }

    pub fn set_capacity(&self, capacity: usize) -> Vec<(K, V)> {
        self.inner.write().set_capacity(capacity)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
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

impl<K, V> MutableCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }
}

impl<K, V> ConcurrentCache for LfuCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.read();
        f.debug_struct("LfuCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_lowest_frequency() {
        let mut core = LfuCore::new(3);
        core.put("a", 1);
        core.put("b", 2);
        core.put("c", 3);
        core.get(&"a");
        core.get(&"c");

        let (_, evicted) = core.put_with_eviction("d", 4);
        assert_eq!(evicted, Some(("b", 2)));
        core.check_invariants().unwrap();
    }

    #[test]
    fn ties_broken_by_oldest_arrival() {
        let mut core = LfuCore::new(3);
        core.put(1, ());
        core.put(2, ());
        core.put(3, ());
        assert_eq!(core.peek_lfu().map(|(k, _, f)| (*k, f)), Some((1, 1)));
        assert_eq!(core.pop_lfu(), Some((1, ())));
        assert_eq!(core.pop_lfu(), Some((2, ())));
    }

    #[test]
    fn update_counts_as_access() {
        let mut core = LfuCore::new(2);
        assert_eq!(core.put("a", 1), PutOutcome::Inserted);
        assert_eq!(core.put("a", 2), PutOutcome::Updated);
        assert_eq!(core.frequency(&"a"), Some(2));
        assert_eq!(core.peek(&"a"), Some(&2));
        assert_eq!(core.len(), 1);
    }

    #[test]
    fn replace_value_and_peek_do_not_count() {
        let mut core = LfuCore::new(2);
        core.put("a", 1);
        assert_eq!(core.replace_value(&"a", 5), Some(1));
        assert_eq!(core.peek(&"a"), Some(&5));
        assert_eq!(core.frequency(&"a"), Some(1));
        assert_eq!(core.replace_value(&"zz", 0), None);
    }

    #[test]
    fn zero_capacity_rejects() {
        let mut core: LfuCore<u32, u32> = LfuCore::new(0);
        assert_eq!(core.put(1, 1), PutOutcome::Rejected);
        assert!(core.is_empty());
        assert_eq!(core.get(&1), None);
    }

    #[test]
    fn remove_and_average() {
        let mut core = LfuCore::with_decay(4, 2.0, 0);
        core.put(1, ());
        core.put(2, ());
        core.get(&1);
        core.get(&1);
        assert_eq!(core.average_frequency(), 2.0);
        assert_eq!(core.remove(&1), Some(()));
        assert_eq!(core.remove(&1), None);
        assert_eq!(core.average_frequency(), 1.0);
        core.remove(&2);
        assert_eq!(core.average_frequency(), 0.0);
        core.check_invariants().unwrap();
    }

    #[test]
    fn set_capacity_evicts_least_frequent() {
        let mut core = LfuCore::new(4);
        for key in 0..4 {
            core.put(key, key);
        }
        core.get(&0);
        core.get(&3);
        let evicted = core.set_capacity(2);
        assert_eq!(evicted, vec![(1, 1), (2, 2)]);
        assert!(core.contains(&0));
        assert!(core.contains(&3));
        core.check_invariants().unwrap();
    }

    #[test]
    fn decay_lowers_outliers_to_ceiling() {
        let mut core = LfuCore::with_decay(4, 2.0, 0);
        for key in 0..4 {
            core.put(key, ());
        }
        for _ in 0..19 {
            core.get(&0);
        }
        // frequencies 20, 1, 1, 1: average 5.75, ceiling 12
        assert_eq!(core.decay(), 1);
        assert_eq!(core.frequency(&0), Some(12));
        assert_eq!(core.frequency(&1), Some(1));
        core.check_invariants().unwrap();

        // frequencies 12, 1, 1, 1: average 3.75, ceiling 8
        assert_eq!(core.decay(), 1);
        assert_eq!(core.frequency(&0), Some(8));
        core.check_invariants().unwrap();
    }

    #[test]
    fn decayed_records_join_ceiling_bucket_at_recent_end() {
        let mut core = LfuCore::with_decay(4, 1.0, 0);
        core.put("low", ());
        core.put("mid", ());
        core.put("high", ());
        core.get(&"mid");
        core.get(&"mid");
        for _ in 0..8 {
            core.get(&"high");
        }
        // frequencies 1, 3, 9: average 13/3, ceiling 5
        core.decay();
        assert_eq!(core.frequency(&"high"), Some(5));
        core.remove(&"low");
        core.get(&"mid");
        core.get(&"mid");
        // mid reached 5 after high was lowered, so high is older in bucket 5
        assert_eq!(core.frequency(&"mid"), Some(5));
        assert_eq!(core.pop_lfu().map(|(k, _)| k), Some("high"));
    }

    #[test]
    fn stale_hot_key_becomes_eviction_candidate() {
        let mut core = LfuCore::with_decay(4, 2.0, 16);
        core.put("hot", 0);
        for _ in 0..99 {
            core.get(&"hot");
        }
        assert_eq!(core.frequency(&"hot"), Some(100));

        let cyclers = ["x", "y", "z"];
        for key in cyclers {
            core.put(key, 0);
        }
        for _ in 0..80 {
            for key in &cyclers {
                core.get(key);
            }
        }

        let hot = core.frequency(&"hot").unwrap();
        for key in &cyclers {
            assert!(hot < core.frequency(key).unwrap());
        }

        let (_, evicted) = core.put_with_eviction("new", 0);
        assert_eq!(evicted.map(|(k, _)| k), Some("hot"));
        core.check_invariants().unwrap();
    }

    #[test]
    fn without_decay_stale_hot_key_stays_pinned() {
        let mut core = LfuCore::with_decay(4, 2.0, 0);
        core.put("hot", 0);
        for _ in 0..99 {
            core.get(&"hot");
        }
        let cyclers = ["x", "y", "z"];
        for key in cyclers {
            core.put(key, 0);
        }
        for _ in 0..80 {
            for key in &cyclers {
                core.get(key);
            }
        }

        assert_eq!(core.frequency(&"hot"), Some(100));
        let (_, evicted) = core.put_with_eviction("new", 0);
        assert_eq!(evicted.map(|(k, _)| k), Some("x"));
        assert!(core.contains(&"hot"));
    }

    #[test]
    fn invalid_decay_factor_is_rejected() {
        let err = LfuCore::<u8, u8>::try_with_decay(4, 0.9, 16).unwrap_err();
        assert!(err.to_string().contains("decay_factor"));
        assert!(LfuCore::<u8, u8>::try_with_decay(4, f64::INFINITY, 16).is_err());
        assert!(LfuCache::<u8, u8>::try_with_decay(4, 1.0, 16).is_ok());
    }

    #[test]
    #[should_panic(expected = "decay_factor")]
    fn with_decay_panics_on_invalid_factor() {
        let _ = LfuCache::<u8, u8>::with_decay(4, -1.0, 16);
    }

    #[test]
    fn default_interval_scales_with_capacity() {
        assert_eq!(default_decay_interval(4), 16);
        assert_eq!(default_decay_interval(1_000), 1_000);
        let core: LfuCore<u8, u8> = LfuCore::new(100);
        assert_eq!(core.decay_interval(), 100);
        assert_eq!(core.decay_factor(), DEFAULT_DECAY_FACTOR);
    }

    #[test]
    fn cache_wrapper_operations() {
        let cache = LfuCache::new(3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);

        assert_eq!(cache.frequency(&1), Some(2));
        assert_eq!(cache.peek(&2), Some("b"));
        assert_eq!(cache.peek_lfu(), Some((2, "b", 1)));
        assert_eq!(cache.average_frequency(), 1.5);
        assert_eq!(cache.replace_value(&2, "c"), Some("b"));
        assert_eq!(cache.pop_lfu(), Some((2, "c")));
        assert_eq!(cache.remove(&1), Some("a"));
        assert!(cache.is_empty());

        cache.put(5, "e");
        let (outcome, _) = cache.put_with_eviction(5, "f");
        assert_eq!(outcome, PutOutcome::Updated);
        assert_eq!(cache.decay(), 0);
        assert_eq!(cache.set_capacity(0), vec![(5, "f")]);
        assert!(!cache.put(6, "g"));
        cache.check_invariants().unwrap();
        cache.clear();
    }
}
