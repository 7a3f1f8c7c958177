//! The entry stored in every recency and frequency list.

/// A cached key/value pair plus the number of times it has been accessed.
///
/// A record lives in exactly one list at a time. Moving it between lists
/// (for example between two LFU frequency buckets) takes it out of one arena
/// and pushes it into the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
    pub access_count: u64,
}

impl<K, V> Record<K, V> {
    /// Creates a record that has been accessed once.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            access_count: 1,
        }
    }

    /// Bumps the access counter and returns the new count.
    pub fn touch(&mut self) -> u64 {
        self.access_count = self.access_count.saturating_add(1);
        self.access_count
    }

    /// Consumes the record, dropping its access count.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
