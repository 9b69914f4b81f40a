//! HashTable: string-keyed table with one ChainedList per bucket.
//!
//! Bucket selection uses a polynomial rolling hash reduced modulo the
//! current capacity at every step, so an index is only meaningful for the
//! capacity it was computed under and is recomputed after each resize.

use crate::chained_list::{self, ChainedList};
use crate::config::TableConfig;
use crate::error::{ConfigError, RemoveError};
use log::debug;

const HASH_PRIME: u128 = 31;

/// Rolling hash of `key` over its UTF-16 code units:
/// `h = (31 * h + unit) % capacity`, starting from 0.
///
/// # Panics
///
/// Panics if `capacity` is zero and `key` is non-empty. `HashTable` never
/// calls it with zero, since its config rejects a zero capacity.
pub fn rolling_hash(key: &str, capacity: usize) -> usize {
    let m = capacity as u128;
    key.encode_utf16()
        .fold(0u128, |h, unit| (HASH_PRIME * h + u128::from(unit)) % m) as usize
}

fn fresh_buckets<V>(capacity: usize) -> Vec<ChainedList<V>> {
    (0..capacity).map(|_| ChainedList::new()).collect()
}

#[derive(Debug, Clone)]
pub struct HashTable<V> {
    load_factor: f64,
    capacity: usize,
    buckets: Vec<ChainedList<V>>,
    len: usize, // mirrors the summed bucket sizes
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, value)` pairs in bucket order, then chain order.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, ChainedList<V>>,
    current: Option<chained_list::Iter<'a, V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }
}

impl<V> HashTable<V> {
    /// Empty table with 16 buckets and load factor 0.75.
    pub fn new() -> Self {
        Self::from_valid(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: TableConfig) -> Self {
        Self {
            load_factor: config.load_factor(),
            capacity: config.capacity(),
            buckets: fresh_buckets(config.capacity()),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Bucket index of `key` under the current capacity.
    pub fn hash(&self, key: &str) -> usize {
        rolling_hash(key, self.capacity)
    }

    /// The chain `key` hashes to.
    pub fn bucket(&self, key: &str) -> &ChainedList<V> {
        &self.buckets[self.hash(key)]
    }

    pub fn buckets(&self) -> &[ChainedList<V>] {
        &self.buckets
    }

    /// Stores `value` under `key`.
    ///
    /// An existing key keeps its node and position and only has its value
    /// replaced. A new key is appended to its chain; if the entry count then
    /// exceeds `capacity * load_factor` the table doubles once before
    /// returning.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let idx = self.hash(&key);
        let bucket = &mut self.buckets[idx];
        if let Some(h) = bucket.find_handle(&key) {
            if let Some(slot) = h.value_mut(bucket) {
                *slot = value;
            }
            return;
        }
        bucket.append(key, value);
        self.len += 1;
        if self.len as f64 > self.capacity as f64 * self.load_factor {
            self.grow();
        }
    }

    // Rehash everything into twice as many buckets, in bucket order then
    // chain order. Reinsertion does not re-check the threshold.
    fn grow(&mut self) {
        let from = self.capacity;
        let old = core::mem::take(&mut self.buckets);
        self.capacity = from * 2;
        self.buckets = fresh_buckets(self.capacity);
        let mut moved = 0usize;
        for (key, value) in old.into_iter().flat_map(ChainedList::into_entries) {
            let idx = self.hash(&key);
            self.buckets[idx].append(key, value);
            moved += 1;
        }
        debug_assert_eq!(moved, self.len);
        debug!(
            "grew table from {} to {} buckets, rehashed {} entries",
            from, self.capacity, moved
        );
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let bucket = self.bucket(key);
        bucket.find_handle(key).and_then(|h| h.value(bucket))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.hash(key);
        let bucket = &mut self.buckets[idx];
        let h = bucket.find_handle(key)?;
        h.value_mut(bucket)
    }

    pub fn has(&self, key: &str) -> bool {
        self.bucket(key).contains(key)
    }

    /// Unlinks `key` from its chain and returns its value.
    ///
    /// An empty target bucket and a non-empty bucket without the key are
    /// reported as different errors.
    pub fn remove(&mut self, key: &str) -> Result<V, RemoveError> {
        let idx = self.hash(key);
        let bucket = &mut self.buckets[idx];
        if bucket.is_empty() {
            return Err(RemoveError::BucketEmpty { bucket: idx });
        }
        let not_found = || RemoveError::KeyNotFound {
            key: key.to_string(),
        };
        let pos = bucket.find(key).ok_or_else(not_found)?;
        let (_, value) = bucket.remove_at(pos).map_err(|_| not_found())?;
        self.len -= 1;
        Ok(value)
    }

    /// Entry count summed over every chain. Walks all buckets.
    pub fn length(&self) -> usize {
        self.buckets.iter().map(ChainedList::size).sum()
    }

    /// Entry count without walking the buckets; always equals `length()`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry. The capacity stays at its current, possibly grown,
    /// value.
    pub fn clear(&mut self) {
        debug!("clearing {} entries, keeping {} buckets", self.len, self.capacity);
        self.buckets = fresh_buckets(self.capacity);
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.to_string()).collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
