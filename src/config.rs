//! Construction-time settings for [`HashTable`](crate::HashTable).

use crate::error::ConfigError;

/// Bucket count a table starts with unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fraction of `capacity` the entry count may reach before the table grows.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Load factor and initial capacity, fixed once the table is built.
///
/// ```
/// use chain_table::{HashTable, TableConfig};
///
/// let cfg = TableConfig::default().with_capacity(4).with_load_factor(0.5);
/// let table: HashTable<u32> = HashTable::with_config(cfg).unwrap();
/// assert_eq!(table.capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    load_factor: f64,
    capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TableConfig {
    pub fn new(load_factor: f64, capacity: usize) -> Self {
        Self {
            load_factor,
            capacity,
        }
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks that the load factor is finite and in (0, 1] and that there is
    /// at least one bucket.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.load_factor.is_finite() && self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
